use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::error::NoteError;
use super::{NoteRef, NoteStore, sanitize_topic};
use crate::constants::MAX_NOTE_BYTES;
use crate::hashing::session_dir_name;

/// Notes as markdown files: `<root>/<hashed session>/<topic>.md`.
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    root: PathBuf,
    max_bytes: usize,
}

impl FileNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_bytes: MAX_NOTE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the file for a note. Topics are sanitized, session ids hashed.
    pub fn note_path(&self, session_id: &str, topic: &str) -> Result<PathBuf, NoteError> {
        self.keyed_path(session_id, topic).map(|(_, path)| path)
    }

    fn keyed_path(&self, session_id: &str, topic: &str) -> Result<(String, PathBuf), NoteError> {
        let key = sanitize_topic(topic).ok_or_else(|| NoteError::InvalidTopic {
            topic: topic.to_string(),
        })?;
        let path = self
            .root
            .join(session_dir_name(session_id))
            .join(format!("{key}.md"));
        Ok((key, path))
    }
}

#[async_trait]
impl NoteStore for FileNoteStore {
    async fn get(&self, session_id: &str, topic: &str) -> Result<Option<String>, NoteError> {
        let path = self.note_path(session_id, topic)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(NoteError::Io { path, source }),
        }
    }

    async fn put(&self, session_id: &str, topic: &str, note: &str) -> Result<NoteRef, NoteError> {
        if note.len() > self.max_bytes {
            return Err(NoteError::TooLarge {
                topic: topic.to_string(),
                bytes: note.len(),
                limit: self.max_bytes,
            });
        }

        let (key, path) = self.keyed_path(session_id, topic)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| NoteError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        // Readers only ever see a complete note.
        let tmp = path.with_extension("md.tmp");
        tokio::fs::write(&tmp, note)
            .await
            .map_err(|source| NoteError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| NoteError::Io {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), bytes = note.len(), "saved note");

        Ok(NoteRef::new(key, note.len()))
    }
}
