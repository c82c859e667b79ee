use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors returned by note stores.
pub enum NoteError {
    /// Topic contained nothing usable as a key.
    #[error("invalid note topic '{topic}'")]
    InvalidTopic { topic: String },

    /// Note exceeds the store's size limit.
    #[error("note '{topic}' is {bytes} bytes, limit is {limit}")]
    TooLarge {
        topic: String,
        bytes: usize,
        limit: usize,
    },

    /// Filesystem failure.
    #[error("note I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
