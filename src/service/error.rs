use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failure of a call to an external collaborator.
pub enum ServiceError {
    /// The call did not complete before its deadline.
    #[error("{service} timed out after {after:?}")]
    Timeout {
        /// Service label.
        service: &'static str,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// Connection or protocol level failure.
    #[error("{service} request failed: {message}")]
    Transport {
        /// Service label.
        service: &'static str,
        /// Error message.
        message: String,
    },

    /// The service answered, but not with something usable.
    #[error("{service} returned an invalid response: {message}")]
    InvalidResponse {
        /// Service label.
        service: &'static str,
        /// Error message.
        message: String,
    },
}

impl ServiceError {
    /// Convenience constructor for transport failures.
    pub fn transport(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            service,
            message: err.to_string(),
        }
    }

    /// Convenience constructor for unusable responses.
    pub fn invalid(service: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            service,
            message: message.into(),
        }
    }

    /// Returns `true` for deadline failures.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
