use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::classifier::{ClassificationRequest, ClassificationService};
use super::parse::intent_to_payload;
use super::types::{Domain, IntentRecord};
use crate::service::ServiceError;

/// Scripted classifier: the first rule whose needle appears in the query wins.
pub struct MockClassifier {
    rules: Vec<(String, String)>,
    fallback: String,
    fail: bool,
    delay: Option<Duration>,
    requests: Mutex<Vec<ClassificationRequest>>,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// Classifies everything as general beauty unless a rule matches.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            fallback: intent_to_payload(&IntentRecord::new(Domain::GeneralBeauty)).to_string(),
            fail: false,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Answers `intent` for queries containing `needle` (case-insensitive).
    pub fn respond(self, needle: &str, intent: &IntentRecord) -> Self {
        let payload = intent_to_payload(intent).to_string();
        self.respond_raw(needle, payload)
    }

    /// Answers a raw payload (possibly invalid) for queries containing `needle`.
    pub fn respond_raw(mut self, needle: &str, payload: impl Into<String>) -> Self {
        self.rules.push((needle.to_lowercase(), payload.into()));
        self
    }

    pub fn fallback(mut self, intent: &IntentRecord) -> Self {
        self.fallback = intent_to_payload(intent).to_string();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ClassificationRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ClassificationService for MockClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<String, ServiceError> {
        self.requests.lock().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(ServiceError::transport("classifier", "mock failure"));
        }

        let query = request.query.to_lowercase();
        let payload = self
            .rules
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, payload)| payload.clone())
            .unwrap_or_else(|| self.fallback.clone());

        Ok(payload)
    }
}
