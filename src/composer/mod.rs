//! Response composition.
//!
//! Builds the generation request (persona, routing facts, evidence, session summary,
//! active note, query), calls the generation service under a deadline, and cleans the
//! answer. A numbered list in the answer becomes the session's next reference list.

pub mod error;
pub mod offtopic;
pub mod postprocess;
pub mod prompt;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::ComposeError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockGenerator;
pub use offtopic::canned_reply;
pub use postprocess::{extract_numbered_list, strip_preamble};
pub use prompt::{PERSONA_PROMPT, render_evidence, render_routing_facts};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatRequest};
use tracing::{debug, instrument};

use crate::comparison::Comparands;
use crate::constants::{NOTE_PREVIEW_CHARS, truncate_chars};
use crate::engine::Degradation;
use crate::intent::{Domain, Subtopic};
use crate::retrieval::Evidence;
use crate::router::{Clarification, Flow};
use crate::service::{ServiceError, with_timeout};

const SERVICE: &str = "generator";

#[derive(Debug, Clone, PartialEq)]
/// Facts about how the turn was routed, shown to the generator.
pub struct RoutingFacts {
    pub domain: Domain,
    pub subtopic: Option<Subtopic>,
    pub flow: Flow,
    pub clarification: Clarification,
    pub resolved_entity: Option<String>,
    pub comparands: Option<Comparands>,
    pub degradations: Vec<Degradation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything the generation service sees for one turn.
pub struct GenerationRequest {
    pub system: String,
    pub routing_facts: String,
    pub evidence: String,
    pub session_summary: String,
    pub note: Option<String>,
    pub query: String,
}

impl GenerationRequest {
    /// The user-role message: facts, evidence, context, then the question.
    pub fn render_user_message(&self) -> String {
        let mut out = String::new();
        out.push_str("ROUTING FACTS:\n");
        out.push_str(&self.routing_facts);
        out.push_str("\nEVIDENCE:\n");
        out.push_str(&self.evidence);
        out.push_str("\nSESSION CONTEXT:\n");
        out.push_str(&self.session_summary);
        out.push('\n');
        if let Some(note) = &self.note {
            out.push_str("\nSAVED NOTE:\n");
            out.push_str(note);
            out.push('\n');
        }
        out.push_str("\nUSER QUESTION: ");
        out.push_str(&self.query);
        out
    }
}

/// Inputs to [`ResponseComposer::compose`].
pub struct ComposeInput<'a> {
    pub query: &'a str,
    pub facts: &'a RoutingFacts,
    pub evidence: &'a Evidence,
    pub session_summary: String,
    pub note: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    Generated,
    Canned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedAnswer {
    pub text: String,
    /// Items of the numbered list shown in the answer, in order. Empty if none.
    pub reference_list: Vec<String>,
    pub source: AnswerSource,
}

#[async_trait]
/// External generation service.
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
}

/// Generation through any chat model reachable by `genai`.
pub struct GenaiGenerator {
    client: Client,
    model: String,
}

impl GenaiGenerator {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerationService for GenaiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let chat = ChatRequest::new(vec![
            ChatMessage::system(request.system.clone()),
            ChatMessage::user(request.render_user_message()),
        ]);

        let response = self
            .client
            .exec_chat(&self.model, chat, None)
            .await
            .map_err(|e| ServiceError::transport(SERVICE, e))?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::invalid(SERVICE, "completion had no text"))
    }
}

pub struct ResponseComposer {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
    canned_off_topic: bool,
}

impl ResponseComposer {
    pub fn new(service: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            canned_off_topic: false,
        }
    }

    /// Answer off-topic turns from the canned table without calling the generator.
    pub fn with_canned_off_topic(mut self, enabled: bool) -> Self {
        self.canned_off_topic = enabled;
        self
    }

    /// Builds the generation request for a turn.
    pub fn build_request(&self, input: &ComposeInput<'_>) -> GenerationRequest {
        GenerationRequest {
            system: PERSONA_PROMPT.to_string(),
            routing_facts: render_routing_facts(input.facts),
            evidence: render_evidence(input.evidence),
            session_summary: input.session_summary.clone(),
            note: input.note.map(|n| truncate_chars(n, NOTE_PREVIEW_CHARS)),
            query: input.query.to_string(),
        }
    }

    #[instrument(skip_all, fields(flow = %input.facts.flow, query_len = input.query.len()))]
    pub async fn compose(&self, input: ComposeInput<'_>) -> Result<ComposedAnswer, ComposeError> {
        if self.canned_off_topic && input.facts.flow == Flow::SkipOffTopic {
            debug!("answering off-topic query from canned replies");
            return Ok(ComposedAnswer {
                text: canned_reply(input.query).to_string(),
                reference_list: Vec::new(),
                source: AnswerSource::Canned,
            });
        }

        let request = self.build_request(&input);
        let raw = with_timeout(SERVICE, self.timeout, self.service.generate(&request)).await?;

        let text = strip_preamble(&raw);
        if text.is_empty() {
            return Err(ComposeError::EmptyAnswer);
        }

        let reference_list = extract_numbered_list(&text);
        debug!(
            answer_len = text.len(),
            list_items = reference_list.len(),
            "composed answer"
        );

        Ok(ComposedAnswer {
            text,
            reference_list,
            source: AnswerSource::Generated,
        })
    }
}
