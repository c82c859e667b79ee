use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why an ordinal could not be mapped to a list entry.
pub enum UnresolvedReason {
    /// No list has been shown in this session (or it was cleared).
    NoList,
    /// The subject changed after the list was shown.
    StaleList,
    /// The index is outside `1..=len`.
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NoList => write!(f, "no list has been shown"),
            UnresolvedReason::StaleList => write!(f, "the list predates the current subject"),
            UnresolvedReason::OutOfRange { index, len } => {
                write!(f, "position {} is outside a list of {}", index, len)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reference resolution failures. Both are recovered by asking the user to clarify.
pub enum ResolveError {
    #[error("cannot resolve '{phrase}': {reason}")]
    UnresolvedReference {
        phrase: String,
        reason: UnresolvedReason,
    },

    #[error("follow-up question but no subject in context")]
    NoSubjectInContext,
}
