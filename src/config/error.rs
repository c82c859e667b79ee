//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}' as a number")]
    InvalidNumber { name: &'static str, value: String },

    /// A boolean variable was not one of the accepted spellings.
    #[error("failed to parse {name}='{value}' as a boolean")]
    InvalidBool { name: &'static str, value: String },

    /// Confidence threshold is outside `[0.0, 1.0]`.
    #[error("confidence threshold must be between 0.0 and 1.0, got {value}")]
    InvalidThreshold { value: f32 },

    /// A size or count that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroValue { name: &'static str },

    /// More candidates kept after rerank than requested from search.
    #[error("top_n ({top_n}) cannot exceed top_k ({top_k})")]
    TopNExceedsTopK { top_n: usize, top_k: usize },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
