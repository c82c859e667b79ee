use thiserror::Error;

use crate::service::ServiceError;

#[derive(Debug, Error)]
/// Retrieval failures. Recovered by falling back to the general flow.
pub enum RetrievalError {
    /// Embedding or vector search failed.
    #[error("vector search unavailable: {source}")]
    Search {
        #[source]
        source: ServiceError,
    },

    /// Rerank call failed.
    #[error("rerank unavailable: {source}")]
    Rerank {
        #[source]
        source: ServiceError,
    },
}

impl RetrievalError {
    /// Returns `true` if the underlying call hit its deadline.
    pub fn is_timeout(&self) -> bool {
        match self {
            RetrievalError::Search { source } | RetrievalError::Rerank { source } => {
                source.is_timeout()
            }
        }
    }

    /// Short label for the failed stage.
    pub fn stage(&self) -> &'static str {
        match self {
            RetrievalError::Search { .. } => "search",
            RetrievalError::Rerank { .. } => "rerank",
        }
    }
}
