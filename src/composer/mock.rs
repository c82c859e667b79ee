use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{GenerationRequest, GenerationService};
use crate::service::ServiceError;

/// Generator that returns a fixed answer and records every request.
pub struct MockGenerator {
    answer: String,
    fail: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new("Here's the scoop.")
    }
}

impl MockGenerator {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            fail: false,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.requests.lock().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl GenerationService for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        self.requests.lock().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(ServiceError::transport("generator", "mock failure"));
        }

        Ok(self.answer.clone())
    }
}
