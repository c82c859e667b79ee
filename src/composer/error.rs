use thiserror::Error;

use crate::service::ServiceError;

#[derive(Debug, Error)]
/// Generation failures. Fatal to the turn.
pub enum ComposeError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Nothing was left after removing preamble and fences.
    #[error("generation returned an empty answer")]
    EmptyAnswer,
}
