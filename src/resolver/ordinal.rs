//! Lexical ordinal detection ("the 2nd one", "number 3", "the last one", "the one above").

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinalPosition {
    /// 1-based position.
    Index(usize),
    /// The final entry of the list.
    Last,
}

impl OrdinalPosition {
    /// Resolves to a 1-based index into a list of `len` entries (may be out of range).
    pub fn to_index(self, len: usize) -> usize {
        match self {
            OrdinalPosition::Index(index) => index,
            OrdinalPosition::Last => len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// An ordinal phrase found in a query, with its byte span.
pub struct OrdinalMatch {
    pub phrase: String,
    pub start: usize,
    pub end: usize,
    pub position: OrdinalPosition,
}

static RE_WORD_ORDINAL: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:the\s+)?(first|second|third|fourth|fifth|sixth|seventh|eighth|ninth|tenth|1st|2nd|3rd|4th|5th|6th|7th|8th|9th|10th)(?:\s+(?:one|item|product|option|pick|choice))?\b",
    )
    .ok()
});

static RE_NUMBERED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\b(?:the\s+)?(?:number|no\.)\s*|#)(\d{1,2})\b").ok()
});

static RE_LAST: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\bthe\s+(?:last|final)(?:\s+(?:one|item|product|option|pick|choice))?\b").ok()
});

static RE_ABOVE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the\s+)?(?:one\s+above|above\s+one|previous\s+one)\b").ok()
});

fn word_to_index(word: &str) -> Option<usize> {
    let index = match word.to_lowercase().as_str() {
        "first" | "1st" => 1,
        "second" | "2nd" => 2,
        "third" | "3rd" => 3,
        "fourth" | "4th" => 4,
        "fifth" | "5th" => 5,
        "sixth" | "6th" => 6,
        "seventh" | "7th" => 7,
        "eighth" | "8th" => 8,
        "ninth" | "9th" => 9,
        "tenth" | "10th" => 10,
        _ => return None,
    };
    Some(index)
}

/// Finds the earliest ordinal phrase in `query`.
pub fn find_ordinal(query: &str) -> Option<OrdinalMatch> {
    let mut found: Vec<OrdinalMatch> = Vec::new();

    if let Some(re) = RE_WORD_ORDINAL.as_ref()
        && let Some(caps) = re.captures(query)
        && let (Some(whole), Some(word)) = (caps.get(0), caps.get(1))
        && let Some(index) = word_to_index(word.as_str())
    {
        found.push(OrdinalMatch {
            phrase: whole.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            position: OrdinalPosition::Index(index),
        });
    }

    if let Some(re) = RE_NUMBERED.as_ref()
        && let Some(caps) = re.captures(query)
        && let (Some(whole), Some(number)) = (caps.get(0), caps.get(1))
        && let Ok(index) = number.as_str().parse::<usize>()
    {
        found.push(OrdinalMatch {
            phrase: whole.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            position: OrdinalPosition::Index(index),
        });
    }

    for re in [RE_LAST.as_ref(), RE_ABOVE.as_ref()].into_iter().flatten() {
        if let Some(whole) = re.find(query) {
            found.push(OrdinalMatch {
                phrase: whole.as_str().to_string(),
                start: whole.start(),
                end: whole.end(),
                position: OrdinalPosition::Last,
            });
        }
    }

    found.into_iter().min_by_key(|m| m.start)
}

/// Returns `query` with the ordinal span replaced by `entity`.
pub fn substitute(query: &str, ordinal: &OrdinalMatch, entity: &str) -> String {
    format!("{}{}{}", &query[..ordinal.start], entity, &query[ordinal.end..])
}

#[cfg(test)]
pub(crate) fn patterns_compile() -> bool {
    RE_WORD_ORDINAL.is_some() && RE_NUMBERED.is_some() && RE_LAST.is_some() && RE_ABOVE.is_some()
}
