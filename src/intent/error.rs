use thiserror::Error;

use crate::service::ServiceError;

#[derive(Debug, Error)]
/// Classification could not produce a valid [`IntentRecord`](super::IntentRecord).
///
/// Every variant is recovered the same way by the engine: the turn degrades to the
/// general flow with a clarification request.
pub enum ClassificationError {
    /// The classification service failed or timed out.
    #[error("classification service failed: {0}")]
    Service(#[from] ServiceError),

    /// Payload was not a JSON object.
    #[error("malformed classifier payload: {message}")]
    Malformed { message: String },

    /// A required field was absent or null.
    #[error("classifier payload is missing '{field}'")]
    MissingField { field: &'static str },

    /// A closed-set field carried a value outside its set.
    #[error("classifier returned unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },
}
