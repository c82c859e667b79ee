//! Section prioritization.
//!
//! The first keyword found in the query selects an ordered list of preferred section
//! labels. Items whose section matches an earlier entry sort first; unmatched sections go
//! last. The sort is stable, so rerank order breaks ties.

use super::types::EvidenceItem;

/// Query keyword to preferred sections, checked in order.
pub static SECTION_PRIORITY: &[(&str, &[&str])] = &[
    ("transfer", &["Real Concerns", "What I LOVE", "Pros & Cons"]),
    ("shade", &["Shade", "Skin-Tone", "Skin Tone", "Gloss Profile"]),
    ("dry", &["Real Concerns", "Pros & Cons"]),
    ("last", &["Longevity", "What I LOVE", "Real Concerns"]),
    ("wear", &["What I LOVE", "Real Concerns", "Finish and Wear"]),
    ("ingredient", &["Formula Breakdown", "Ingredients"]),
    ("oxidiz", &["Shade Analysis", "Real Concerns", "Colorimetric"]),
    ("humid", &["What I LOVE", "Climate", "Real Concerns"]),
    ("oil", &["What I LOVE", "Skin Type Suitability"]),
    ("cover", &["Product Overview", "What I LOVE", "Coverage"]),
    ("finish", &["Product Overview", "Gloss Profile", "What I LOVE"]),
    ("melt", &["Real Concerns", "Climate"]),
    ("fade", &["Real Concerns", "Longevity"]),
    ("price", &["Pros & Cons", "Value", "Price Positioning"]),
    ("worth", &["Pros & Cons", "Value", "User Consensus"]),
    ("recommend", &["Verdict", "Who It's For", "Pros & Cons"]),
];

/// Used when no keyword matches.
pub static DEFAULT_SECTION_ORDER: &[&str] =
    &["Overview", "What I LOVE", "Real Concerns", "Pros & Cons"];

/// Preferred section order for `query`.
pub fn active_order(query: &str) -> &'static [&'static str] {
    let query = query.to_lowercase();
    SECTION_PRIORITY
        .iter()
        .find(|(keyword, _)| query.contains(keyword))
        .map(|(_, sections)| *sections)
        .unwrap_or(DEFAULT_SECTION_ORDER)
}

/// Rank of `section` in `order` (lower is better); unmatched sections rank last.
pub fn section_rank(section: &str, order: &[&str]) -> usize {
    let section = section.to_lowercase();
    order
        .iter()
        .position(|preferred| section.contains(&preferred.to_lowercase()))
        .unwrap_or(order.len())
}

/// Reorders `items` for `query` and keeps at most `limit` of them.
pub fn prioritize(mut items: Vec<EvidenceItem>, query: &str, limit: usize) -> Vec<EvidenceItem> {
    let order = active_order(query);
    items.sort_by_key(|item| section_rank(&item.section, order));
    items.truncate(limit);
    items
}
