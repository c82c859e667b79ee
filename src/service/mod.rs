//! Shared plumbing for calls into external services.
//!
//! Every classifier, search, rerank, generation and note call goes through [`with_timeout`],
//! so a stalled dependency surfaces as [`ServiceError::Timeout`] instead of hanging the turn.

pub mod error;


pub use error::ServiceError;

use std::future::Future;
use std::time::Duration;

/// Runs `fut` with a deadline of `limit`; elapsed deadlines become [`ServiceError::Timeout`].
pub async fn with_timeout<T, F>(
    service: &'static str,
    limit: Duration,
    fut: F,
) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(service, timeout_ms = limit.as_millis() as u64, "call timed out");
            Err(ServiceError::Timeout {
                service,
                after: limit,
            })
        }
    }
}
