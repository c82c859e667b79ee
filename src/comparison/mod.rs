//! Comparison detection ("A vs B", "compare A and B", "difference between A and B", "A or B").
//!
//! Patterns are tried in table order and the first match wins. A match whose captured
//! group is empty after trimming is declined so the caller falls back to single-subject
//! retrieval instead of searching for nothing.


use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonPattern {
    Versus,
    Compare,
    DifferenceBetween,
    Or,
}

impl ComparisonPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonPattern::Versus => "versus",
            ComparisonPattern::Compare => "compare",
            ComparisonPattern::DifferenceBetween => "difference_between",
            ComparisonPattern::Or => "or",
        }
    }
}

impl fmt::Display for ComparisonPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two subjects of a comparison, in query order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparands {
    pub left: String,
    pub right: String,
}

impl Comparands {
    pub fn as_array(&self) -> [&str; 2] {
        [&self.left, &self.right]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonMatch {
    Pair(Comparands),
    /// A pattern matched but left a comparand empty.
    Declined { pattern: ComparisonPattern },
    NoMatch,
}

impl ComparisonMatch {
    pub fn comparands(&self) -> Option<&Comparands> {
        match self {
            ComparisonMatch::Pair(pair) => Some(pair),
            _ => None,
        }
    }
}

static PATTERNS: LazyLock<Vec<(ComparisonPattern, Regex)>> = LazyLock::new(|| {
    [
        (
            ComparisonPattern::Versus,
            r"(?i)^(?P<left>.*?)\s*\b(?:vs|versus)\b\.?\s*(?P<right>.*)$",
        ),
        (
            ComparisonPattern::Compare,
            r"(?i)\bcompare\s+(?P<left>.*?)\s+(?:and|with|to|against)\s+(?P<right>.*)$",
        ),
        (
            ComparisonPattern::DifferenceBetween,
            r"(?i)\bdifference\s+between\s+(?P<left>.*?)\s+and\s+(?P<right>.*)$",
        ),
        (
            ComparisonPattern::Or,
            r"(?i)^(?P<lead>(?:should\s+i\s+(?:get|buy|choose|pick)|which\s+is\s+better,?|which\s+one,?)\s+)?(?P<left>.*?)\s+or\s+(?P<right>.*)$",
        ),
    ]
    .into_iter()
    .filter_map(|(pattern, source)| Regex::new(source).ok().map(|re| (pattern, re)))
    .collect()
});

/// Longest side, in words, of an "A or B" query without a lead-in.
const MAX_BARE_OR_WORDS: usize = 4;

/// Words that open a question rather than a product name.
static QUESTION_WORDS: &[&str] = &[
    "does", "do", "is", "are", "can", "will", "would", "should", "how", "what", "which", "why",
    "when", "where", "who", "tell", "i", "my",
];

/// A bare "A or B" only compares when both sides read like product names, so
/// "does it transfer or smudge" stays a single-subject question.
fn bare_or_is_comparison(left: &str, right: &str) -> bool {
    let short = |side: &str| side.split_whitespace().count() <= MAX_BARE_OR_WORDS;
    let opens_question = left
        .split_whitespace()
        .next()
        .is_some_and(|word| QUESTION_WORDS.contains(&word.to_lowercase().as_str()));

    short(left) && short(right) && !opens_question
}

/// Detects a two-way comparison in `query`.
pub fn detect(query: &str) -> ComparisonMatch {
    let query = query.trim().trim_end_matches(['?', '!', '.']).trim_end();

    for (pattern, re) in PATTERNS.iter() {
        let Some(caps) = re.captures(query) else {
            continue;
        };

        let left = caps.name("left").map(|m| m.as_str().trim()).unwrap_or_default();
        let right = caps.name("right").map(|m| m.as_str().trim()).unwrap_or_default();

        if left.is_empty() || right.is_empty() {
            return ComparisonMatch::Declined { pattern: *pattern };
        }

        if *pattern == ComparisonPattern::Or
            && caps.name("lead").is_none()
            && !bare_or_is_comparison(left, right)
        {
            continue;
        }

        return ComparisonMatch::Pair(Comparands {
            left: left.to_string(),
            right: right.to_string(),
        });
    }

    ComparisonMatch::NoMatch
}

#[cfg(test)]
pub(crate) fn patterns_compile() -> bool {
    PATTERNS.len() == 4
}
