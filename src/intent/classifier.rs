use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, instrument};

use super::error::ClassificationError;
use super::parse::parse_intent;
use super::prompt::{CLASSIFIER_SYSTEM_PROMPT, render_classification_request};
use super::types::IntentRecord;
use crate::constants::NOTE_PREVIEW_CHARS;
use crate::constants::truncate_chars;
use crate::service::{ServiceError, with_timeout};
use crate::session::SessionState;

const SERVICE: &str = "classifier";

#[derive(Debug, Clone, PartialEq, Eq)]
/// The most recent completed turn, as shown to the classifier.
pub struct PriorTurn {
    pub query: String,
    pub answer_preview: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything the classification service sees for one query.
pub struct ClassificationRequest {
    pub query: String,
    pub session_summary: String,
    pub reference_list: Vec<String>,
    pub reference_topic: Option<String>,
    pub prior_turn: Option<PriorTurn>,
    pub note_preview: Option<String>,
}

impl ClassificationRequest {
    /// Builds a request from a session snapshot and the active note (if one was loaded).
    pub fn from_session(query: &str, state: &SessionState, note: Option<&str>) -> Self {
        let (reference_list, reference_topic) = match state.reference_list() {
            Some(list) => (list.items().to_vec(), list.topic().map(str::to_string)),
            None => (Vec::new(), None),
        };

        let prior_turn = match (state.last_query(), state.last_answer_preview()) {
            (Some(query), Some(answer)) => Some(PriorTurn {
                query: query.to_string(),
                answer_preview: answer.to_string(),
            }),
            _ => None,
        };

        Self {
            query: query.to_string(),
            session_summary: state.summarize(),
            reference_list,
            reference_topic,
            prior_turn,
            note_preview: note.map(|n| truncate_chars(n, NOTE_PREVIEW_CHARS)),
        }
    }
}

#[async_trait]
/// External classification service. Returns the raw structured payload.
pub trait ClassificationService: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> Result<String, ServiceError>;
}

/// Classification through any chat model reachable by `genai`.
pub struct GenaiClassifier {
    client: Client,
    model: String,
}

impl GenaiClassifier {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl ClassificationService for GenaiClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<String, ServiceError> {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
            ChatMessage::user(render_classification_request(request)),
        ]);
        let options = ChatOptions::default().with_temperature(0.0);

        let response = self
            .client
            .exec_chat(&self.model, chat, Some(&options))
            .await
            .map_err(|e| ServiceError::transport(SERVICE, e))?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::invalid(SERVICE, "completion had no text"))
    }
}

/// Calls the classification service under a deadline and validates its payload.
pub struct IntentClassifier {
    service: Arc<dyn ClassificationService>,
    timeout: Duration,
}

impl IntentClassifier {
    pub fn new(service: Arc<dyn ClassificationService>, timeout: Duration) -> Self {
        Self { service, timeout }
    }

    #[instrument(skip_all, fields(query_len = request.query.len()))]
    pub async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<IntentRecord, ClassificationError> {
        let payload = with_timeout(SERVICE, self.timeout, self.service.classify(request)).await?;
        let intent = parse_intent(&payload)?;

        debug!(
            domain = %intent.domain,
            needs_retrieval = intent.needs_retrieval,
            has_ordinal = intent.has_ordinal,
            is_followup = intent.is_followup,
            category = ?intent.detected_category,
            "classified query"
        );

        Ok(intent)
    }
}
