//! Note persistence adapter.
//!
//! Topic notes are keyed by `(session_id, topic)`. Absence is a normal outcome; the engine
//! only ever holds note text for the turn that loaded it.

pub mod error;
pub mod file;

#[cfg(any(test, feature = "mock"))]
pub mod memory;

#[cfg(test)]
mod tests;

pub use error::NoteError;
pub use file::FileNoteStore;
#[cfg(any(test, feature = "mock"))]
pub use memory::InMemoryNoteStore;

use std::fmt::Write;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Longest sanitized topic key.
pub const MAX_TOPIC_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Pointer from a session's note index into the store.
pub struct NoteRef {
    pub topic: String,
    pub bytes: usize,
    pub updated_at: DateTime<Utc>,
}

impl NoteRef {
    pub fn new(topic: impl Into<String>, bytes: usize) -> Self {
        Self {
            topic: topic.into(),
            bytes,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
/// Key-value note storage scoped by session.
pub trait NoteStore: Send + Sync {
    /// Returns the note for `topic`, or `None` if nothing was saved.
    async fn get(&self, session_id: &str, topic: &str) -> Result<Option<String>, NoteError>;

    /// Stores `note` under `topic`, replacing any previous note.
    async fn put(&self, session_id: &str, topic: &str, note: &str) -> Result<NoteRef, NoteError>;
}

/// Normalizes a topic to `[a-z0-9_]`, collapsing runs of other characters into one `_`.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_topic(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    let out: String = out.chars().take(MAX_TOPIC_LEN).collect();
    let out = out.trim_end_matches('_');
    (!out.is_empty()).then(|| out.to_string())
}

/// Markdown body for a saved product list.
pub fn render_list_note(topic: &str, items: &[String]) -> String {
    let mut out = format!("# {topic}\n_saved {}_\n\n", Utc::now().format("%Y-%m-%d %H:%M UTC"));
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, item);
    }
    out
}
