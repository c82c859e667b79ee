use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::error::NoteError;
use super::{NoteRef, NoteStore, sanitize_topic};

/// Note store backed by a map; optionally fails every write.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: RwLock<HashMap<(String, String), String>>,
    fail_writes: bool,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.notes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.read().is_empty()
    }

    /// Seeds a note directly, bypassing [`NoteStore::put`].
    pub fn insert(&self, session_id: &str, topic: &str, note: &str) {
        if let Some(key) = sanitize_topic(topic) {
            self.notes
                .write()
                .insert((session_id.to_string(), key), note.to_string());
        }
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn get(&self, session_id: &str, topic: &str) -> Result<Option<String>, NoteError> {
        let key = sanitize_topic(topic).ok_or_else(|| NoteError::InvalidTopic {
            topic: topic.to_string(),
        })?;
        Ok(self
            .notes
            .read()
            .get(&(session_id.to_string(), key))
            .cloned())
    }

    async fn put(&self, session_id: &str, topic: &str, note: &str) -> Result<NoteRef, NoteError> {
        let key = sanitize_topic(topic).ok_or_else(|| NoteError::InvalidTopic {
            topic: topic.to_string(),
        })?;
        if self.fail_writes {
            return Err(NoteError::Io {
                path: key.clone().into(),
                source: std::io::Error::other("mock write failure"),
            });
        }
        self.notes
            .write()
            .insert((session_id.to_string(), key.clone()), note.to_string());
        Ok(NoteRef::new(key, note.len()))
    }
}
