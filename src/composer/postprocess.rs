//! Answer clean-up and numbered-list extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::MAX_REFERENCE_ITEMS;

/// Lines at most this long are candidates for preamble removal.
pub const META_LINE_MAX_CHARS: usize = 160;

static RE_META: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:now\s+)?(?:i'll|i've|i will|i have|i'm|let me|saving|updating|checking|recording|noting)\b.*?\b(?:memory|memories|notes?|sav(?:e|ed|ing)|record|updat(?:e|ed|ing)|check)\b",
    )
    .ok()
});

static RE_NOTES_DONE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:memory|notes?)\s+(?:updated|saved)\b").ok()
});

static RE_NUMBERED_ITEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\s*(?:\*\*)?(\d{1,2})[.)]\s+(.+)$").ok());

fn is_meta_line(line: &str) -> bool {
    let line = line.trim();
    if line.chars().count() > META_LINE_MAX_CHARS {
        return false;
    }
    [&RE_META, &RE_NOTES_DONE]
        .iter()
        .any(|re| re.as_ref().is_some_and(|re| re.is_match(line)))
}

/// Removes wrapping code fences and leading note/memory chatter from an answer.
pub fn strip_preamble(answer: &str) -> String {
    let mut text = answer.trim();

    if let Some(inner) = text.strip_prefix("```") {
        let inner = inner.split_once('\n').map_or("", |(_, rest)| rest);
        text = inner.trim_end().strip_suffix("```").unwrap_or(inner).trim();
    }

    let lines: Vec<&str> = text
        .lines()
        .skip_while(|line| line.trim().is_empty() || is_meta_line(line))
        .collect();

    lines
        .join("\n")
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':'))
        .trim_end()
        .to_string()
}

/// Extracts item names from the first numbered list in `answer`.
///
/// Accepts `1. Name`, `2) Name` and bold variants; drops markdown bold and anything after
/// ` - `, ` – ` or `: `. The list ends at the first line that does not continue it.
pub fn extract_numbered_list(answer: &str) -> Vec<String> {
    let Some(re) = RE_NUMBERED_ITEM.as_ref() else {
        return Vec::new();
    };

    let mut items = Vec::new();
    let mut expected = 1usize;

    for line in answer.lines() {
        let Some(caps) = re.captures(line) else {
            if items.is_empty() || line.trim().is_empty() {
                continue;
            }
            // Indented detail lines belong to the previous item.
            if line.starts_with([' ', '\t']) {
                continue;
            }
            break;
        };

        let number: usize = caps[1].parse().unwrap_or(0);
        if number != expected {
            if items.is_empty() {
                continue;
            }
            break;
        }

        if let Some(name) = clean_item_name(&caps[2]) {
            items.push(name);
            expected += 1;
        }

        if items.len() == MAX_REFERENCE_ITEMS {
            break;
        }
    }

    items
}

fn clean_item_name(raw: &str) -> Option<String> {
    let raw = raw.replace("**", "");
    let name = [" - ", " – ", " — ", ": "]
        .iter()
        .fold(raw.as_str(), |acc, sep| {
            acc.split_once(sep).map_or(acc, |(head, _)| head)
        })
        .trim()
        .trim_end_matches([':', '.', ','])
        .trim();

    (!name.is_empty()).then(|| name.to_string())
}
