//! Cross-cutting, shared constants.
//!
//! Retrieval sizes and the confidence threshold here are only defaults; the running values
//! come from [`Config`](crate::config::Config).

use std::time::Duration;

/// Shortest accepted query, in characters (after trimming).
pub const MIN_QUERY_CHARS: usize = 2;
/// Longest accepted query, in characters.
pub const MAX_QUERY_CHARS: usize = 5000;

pub const DEFAULT_TOP_K: usize = 30;
pub const DEFAULT_COMPARE_TOP_K: usize = 20;
pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_EVIDENCE_LIMIT: usize = 6;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.4;

pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS);

pub const DEFAULT_MAX_SESSIONS: u64 = 10_000;
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 6 * 60 * 60;

/// Turns kept in a session's history ring.
pub const MAX_HISTORY_TURNS: usize = 10;
/// Turns rendered into the rolling summary.
pub const SUMMARY_RECENT_TURNS: usize = 2;
pub const MAX_SUMMARY_CHARS: usize = 1000;
pub const ANSWER_PREVIEW_CHARS: usize = 200;
pub const QUERY_PREVIEW_CHARS: usize = 200;

/// Largest note the file store will write.
pub const MAX_NOTE_BYTES: usize = 100 * 1024;
/// Topic for a list shown while the session has no subject. Each such list replaces the last.
pub const UNSCOPED_LIST_TOPIC: &str = "list_latest";
/// Note text handed to the classifier and composer for the active turn.
pub const NOTE_PREVIEW_CHARS: usize = 2000;

/// Per-item content cap when rendering evidence for generation.
pub const EVIDENCE_CONTENT_CHARS: usize = 1500;

/// Upper bound on entries taken from a numbered list in an answer.
pub const MAX_REFERENCE_ITEMS: usize = 10;

/// Truncates `text` to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
