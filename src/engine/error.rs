use thiserror::Error;

use crate::composer::ComposeError;

#[derive(Debug, Error)]
/// Turn failures. Session state is left untouched when either is returned.
pub enum EngineError {
    /// Rejected before any service call.
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },

    /// Generation failed or timed out; the caller should offer a retry.
    #[error("generation failed: {0}")]
    GenerationFailure(#[from] ComposeError),
}
