//! Turn orchestration.
//!
//! One turn: validate, lock the session, load the active note, classify, resolve, route,
//! detect comparisons, retrieve, compose, then commit. Recoverable failures degrade the
//! turn and are reported in [`TurnOutcome::degradations`]. Session state is mutated only
//! in the commit step, after generation succeeded, so a failed or cancelled turn leaves
//! it untouched.

pub mod config;
pub mod error;
pub mod outcome;

#[cfg(test)]
mod tests;

pub use config::EngineSettings;
pub use error::EngineError;
pub use outcome::{Degradation, TurnOutcome};

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::comparison::{self, ComparisonMatch, Comparands};
use crate::composer::{
    ComposeInput, ComposedAnswer, GenerationService, ResponseComposer, RoutingFacts,
};
use crate::constants::{MAX_QUERY_CHARS, MIN_QUERY_CHARS, UNSCOPED_LIST_TOPIC};
use crate::intent::{
    ClarificationType, ClassificationRequest, ClassificationService, Domain, IntentClassifier,
    IntentRecord,
};
use crate::notes::{NoteRef, NoteStore, render_list_note, sanitize_topic};
use crate::resolver::{self, ResolveError, Resolution};
use crate::retrieval::{Evidence, RerankService, RetrievalOrchestrator, VectorSearch};
use crate::router::{self, Clarification, RoutingDecision};
use crate::session::{
    CompletedTurn, ListUpdate, SessionState, SessionStore, SessionUpdate, Subject,
};

/// External collaborators the engine calls.
pub struct EngineServices {
    pub classifier: Arc<dyn ClassificationService>,
    pub search: Arc<dyn VectorSearch>,
    pub reranker: Arc<dyn RerankService>,
    pub generator: Arc<dyn GenerationService>,
    pub notes: Arc<dyn NoteStore>,
}

pub struct QueryEngine {
    sessions: SessionStore,
    classifier: IntentClassifier,
    retrieval: RetrievalOrchestrator,
    composer: ResponseComposer,
    notes: Arc<dyn NoteStore>,
    settings: EngineSettings,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("sessions", &self.sessions)
            .field("settings", &self.settings)
            .finish()
    }
}

/// Evidence gathered for a retrieve-flow turn.
struct Gathered {
    evidence: Evidence,
    comparands: Option<Comparands>,
    usable: bool,
}

impl QueryEngine {
    pub fn new(services: EngineServices, settings: EngineSettings) -> Self {
        let EngineServices {
            classifier,
            search,
            reranker,
            generator,
            notes,
        } = services;

        Self {
            sessions: SessionStore::new(settings.max_sessions, settings.session_idle),
            classifier: IntentClassifier::new(classifier, settings.call_timeout),
            retrieval: RetrievalOrchestrator::new(search, reranker, settings.retrieval.clone()),
            composer: ResponseComposer::new(generator, settings.call_timeout)
                .with_canned_off_topic(settings.canned_off_topic),
            notes,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Snapshot of a session (creates it if unknown).
    pub async fn session_snapshot(&self, session_id: &str) -> SessionState {
        self.sessions.load(session_id).await
    }

    /// Forgets a session's conversational memory.
    pub async fn reset_session(&self, session_id: &str) {
        self.sessions.reset(session_id).await;
        info!(session_id, "session reset");
    }

    /// Processes one user turn.
    ///
    /// Turns for the same session are serialized on the session's lock; turns for
    /// different sessions run independently.
    #[instrument(skip_all, fields(session_id = %session_id, query_len = query.len()))]
    pub async fn handle_turn(
        &self,
        session_id: &str,
        query: &str,
    ) -> Result<TurnOutcome, EngineError> {
        let query = validate_query(query)?;

        let handle = self.sessions.handle(session_id);
        let mut state = handle.lock().await;

        let mut degradations = Vec::new();

        let note_topic = active_note_topic(&state);
        let note = match &note_topic {
            Some(topic) => self.load_note(session_id, topic).await,
            None => None,
        };

        let request = ClassificationRequest::from_session(&query, &state, note.as_deref());
        let intent = match self.classifier.classify(&request).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, "classification invalid, continuing as general");
                degradations.push(Degradation::ClassificationInvalid {
                    reason: e.to_string(),
                });
                IntentRecord::degraded()
            }
        };

        let (resolution, resolve_error) = resolve_references(&query, &intent, &state);
        if let Some(e) = &resolve_error {
            warn!(error = %e, "reference unresolved, asking for clarification");
            degradations.push(match e {
                ResolveError::UnresolvedReference { phrase, reason } => {
                    Degradation::UnresolvedReference {
                        phrase: phrase.clone(),
                        reason: reason.clone(),
                    }
                }
                ResolveError::NoSubjectInContext => Degradation::NoSubjectInContext,
            });
        }

        let mut decision = router::route(&intent, &resolution);
        if resolve_error.is_some() {
            decision.fall_back_to_general();
            decision.carried_clarification =
                Clarification::required(ClarificationType::Reference);
        }

        debug!(flow = %decision.flow, demoted = decision.demoted, "routed");

        let mut comparands = None;
        let mut evidence = Evidence::None;
        if let Some(retrieval_query) = decision.retrieval_query.clone() {
            let gathered = self
                .gather_evidence(&retrieval_query, &decision, &mut degradations)
                .await;
            if !gathered.usable {
                decision.fall_back_to_general();
            }
            comparands = gathered.comparands;
            evidence = gathered.evidence;
        }

        let facts = RoutingFacts {
            domain: intent.domain,
            subtopic: intent.subtopic,
            flow: decision.flow,
            clarification: decision.carried_clarification,
            resolved_entity: resolution.resolved_entity.clone(),
            comparands,
            degradations: degradations.clone(),
        };

        let answer = match self
            .composer
            .compose(ComposeInput {
                query: &query,
                facts: &facts,
                evidence: &evidence,
                session_summary: state.summarize(),
                note: note.as_deref(),
            })
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                error!(error = %e, flow = %decision.flow, "generation failed, session unchanged");
                return Err(EngineError::GenerationFailure(e));
            }
        };

        let update = self
            .build_update(session_id, &query, &state, &resolution, &answer)
            .await;
        state.apply(update);

        info!(
            turn = state.turn_count(),
            flow = %decision.flow,
            domain = %intent.domain,
            evidence_items = evidence.item_count(),
            degradations = degradations.len(),
            list_items = answer.reference_list.len(),
            "turn complete"
        );

        Ok(TurnOutcome {
            session_id: session_id.to_string(),
            turn: state.turn_count(),
            answer: answer.text,
            source: answer.source,
            intent,
            decision,
            resolved_query: resolution.resolved_query,
            resolved_entity: resolution.resolved_entity,
            evidence,
            degradations,
            reference_list: answer.reference_list,
        })
    }

    async fn gather_evidence(
        &self,
        retrieval_query: &str,
        decision: &RoutingDecision,
        degradations: &mut Vec<Degradation>,
    ) -> Gathered {
        match comparison::detect(retrieval_query) {
            ComparisonMatch::Pair(pair) => {
                debug!(left = %pair.left, right = %pair.right, "comparison detected");
                let mut sets = Vec::with_capacity(2);

                for (label, result) in self.retrieval.retrieve_comparison(&pair).await {
                    match result {
                        Ok(set) if set.is_usable() => sets.push((label, set)),
                        Ok(set) => {
                            warn!(comparand = %label, verdict = %set.verdict, "comparand below confidence");
                            degradations.push(Degradation::LowConfidence {
                                comparand: Some(label),
                                top_score: set.verdict.score(),
                            });
                        }
                        Err(e) => {
                            warn!(comparand = %label, error = %e, "comparand retrieval unavailable");
                            degradations.push(Degradation::RetrievalUnavailable {
                                comparand: Some(label),
                                reason: e.to_string(),
                            });
                        }
                    }
                }

                let usable = !sets.is_empty();
                Gathered {
                    evidence: if usable {
                        Evidence::Comparison(sets)
                    } else {
                        Evidence::None
                    },
                    comparands: Some(pair),
                    usable,
                }
            }
            found => {
                if let ComparisonMatch::Declined { pattern } = found {
                    warn!(%pattern, "comparison declined, empty comparand");
                    degradations.push(Degradation::EmptyComparand { pattern });
                }

                match self
                    .retrieval
                    .retrieve(retrieval_query, decision.category_filter)
                    .await
                {
                    Ok(set) if set.is_usable() => Gathered {
                        evidence: Evidence::Single(set),
                        comparands: None,
                        usable: true,
                    },
                    Ok(set) => {
                        warn!(verdict = %set.verdict, "evidence below confidence, answering as general");
                        degradations.push(Degradation::LowConfidence {
                            comparand: None,
                            top_score: set.verdict.score(),
                        });
                        Gathered {
                            evidence: Evidence::None,
                            comparands: None,
                            usable: false,
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "retrieval unavailable, answering as general");
                        degradations.push(Degradation::RetrievalUnavailable {
                            comparand: None,
                            reason: e.to_string(),
                        });
                        Gathered {
                            evidence: Evidence::None,
                            comparands: None,
                            usable: false,
                        }
                    }
                }
            }
        }
    }

    /// Assembles the end-of-turn update, saving a shown list as a topic note.
    async fn build_update(
        &self,
        session_id: &str,
        query: &str,
        state: &SessionState,
        resolution: &Resolution,
        answer: &ComposedAnswer,
    ) -> SessionUpdate {
        let mut update = SessionUpdate {
            subject: resolution.subject.clone(),
            turn: Some(CompletedTurn {
                query: query.to_string(),
                answer: answer.text.clone(),
            }),
            ..Default::default()
        };

        if answer.reference_list.is_empty() {
            update.reference_list = Some(ListUpdate::Clear);
            return update;
        }

        let topic = list_topic(state, resolution);
        if let Some(note_ref) = self.save_list_note(session_id, &topic, &answer.reference_list).await
        {
            update.notes.push(note_ref);
        }

        update.reference_list = Some(ListUpdate::Replace {
            items: answer.reference_list.clone(),
            topic: Some(topic),
        });
        update
    }

    async fn load_note(&self, session_id: &str, topic: &str) -> Option<String> {
        match tokio::time::timeout(self.settings.call_timeout, self.notes.get(session_id, topic))
            .await
        {
            Ok(Ok(note)) => note,
            Ok(Err(e)) => {
                warn!(topic, error = %e, "note load failed");
                None
            }
            Err(_) => {
                warn!(topic, "note load timed out");
                None
            }
        }
    }

    async fn save_list_note(
        &self,
        session_id: &str,
        topic: &str,
        items: &[String],
    ) -> Option<NoteRef> {
        let body = render_list_note(topic, items);
        match tokio::time::timeout(
            self.settings.call_timeout,
            self.notes.put(session_id, topic, &body),
        )
        .await
        {
            Ok(Ok(note_ref)) => {
                debug!(topic, bytes = note_ref.bytes, "list note saved");
                Some(note_ref)
            }
            Ok(Err(e)) => {
                warn!(topic, error = %e, "list note save failed");
                None
            }
            Err(_) => {
                warn!(topic, "list note save timed out");
                None
            }
        }
    }
}

/// Trims `query` and checks its length.
pub fn validate_query(query: &str) -> Result<String, EngineError> {
    let query = query.trim();
    let chars = query.chars().count();

    if chars < MIN_QUERY_CHARS {
        return Err(EngineError::InvalidQuery {
            reason: format!("query must be at least {MIN_QUERY_CHARS} characters"),
        });
    }
    if chars > MAX_QUERY_CHARS {
        return Err(EngineError::InvalidQuery {
            reason: format!("query must be at most {MAX_QUERY_CHARS} characters"),
        });
    }

    Ok(query.to_string())
}

/// Resolves references, or returns an unresolved passthrough together with the error.
///
/// Off-topic turns skip resolution entirely.
fn resolve_references(
    query: &str,
    intent: &IntentRecord,
    state: &SessionState,
) -> (Resolution, Option<ResolveError>) {
    if intent.domain == Domain::OffTopic {
        return (Resolution::passthrough(query, None), None);
    }

    match resolver::resolve(query, intent, state) {
        Ok(resolution) => (resolution, None),
        Err(e) => {
            let mut resolution = Resolution::passthrough(query, intent.detected_category);
            resolution.subject = None;
            (resolution, Some(e))
        }
    }
}

/// Topic of the note to load for this turn: the shown list's, else the subject's.
fn active_note_topic(state: &SessionState) -> Option<String> {
    let list_topic = state
        .reference_list()
        .and_then(|list| list.topic())
        .map(str::to_string);
    let subject_topic = state.current_subject().and_then(subject_topic);

    [list_topic, subject_topic]
        .into_iter()
        .flatten()
        .find(|topic| state.note_ref(topic).is_some())
}

fn subject_topic(subject: &Subject) -> Option<String> {
    subject
        .display_name()
        .or_else(|| subject.category.map(|c| c.key().to_string()))
        .and_then(|name| sanitize_topic(&name))
}

/// Topic a newly shown list is saved under.
fn list_topic(state: &SessionState, resolution: &Resolution) -> String {
    resolution
        .subject
        .as_ref()
        .or(state.current_subject())
        .and_then(subject_topic)
        .unwrap_or_else(|| UNSCOPED_LIST_TOPIC.to_string())
}
