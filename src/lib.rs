//! Rouge: query routing and retrieval orchestration for a beauty product Q&A assistant.
//!
//! A turn flows through the modules in this order:
//!
//! - [`session`] supplies per-session context (subject, reference list, summary)
//! - [`intent`] classifies the query through an external model and validates the payload
//! - [`resolver`] maps ordinals and follow-ups onto concrete entities
//! - [`router`] picks one of four flows
//! - [`comparison`] splits "A vs B" style queries into two comparands
//! - [`retrieval`] runs search, rerank, the confidence gate and section ordering
//! - [`composer`] builds the generation request and cleans the answer
//! - [`notes`] persists shown lists as per-session topic notes
//!
//! [`QueryEngine`] ties them together and commits session state at the end of each turn.
//!
//! ## Test/Mock Support
//! Scripted service doubles are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod comparison;
pub mod composer;
pub mod config;
pub mod constants;
pub mod engine;
pub mod hashing;
pub mod intent;
pub mod notes;
pub mod resolver;
pub mod retrieval;
pub mod router;
pub mod service;
pub mod session;

pub use comparison::{Comparands, ComparisonMatch, ComparisonPattern};
pub use composer::{
    AnswerSource, ComposeError, ComposedAnswer, GenaiGenerator, GenerationRequest,
    GenerationService, ResponseComposer, RoutingFacts,
};
#[cfg(any(test, feature = "mock"))]
pub use composer::MockGenerator;
pub use config::{Config, ConfigError};
pub use engine::{
    Degradation, EngineError, EngineServices, EngineSettings, QueryEngine, TurnOutcome,
};
pub use intent::{
    Category, ClarificationType, ClassificationError, ClassificationRequest,
    ClassificationService, Domain, GenaiClassifier, IntentClassifier, IntentRecord, Subtopic,
};
#[cfg(any(test, feature = "mock"))]
pub use intent::MockClassifier;
#[cfg(any(test, feature = "mock"))]
pub use notes::InMemoryNoteStore;
pub use notes::{FileNoteStore, NoteError, NoteRef, NoteStore};
pub use resolver::{Resolution, ResolutionSource, ResolveError, UnresolvedReason};
#[cfg(any(test, feature = "mock"))]
pub use retrieval::{MockReranker, MockVectorSearch};
pub use retrieval::{
    ConfidenceGate, ConfidenceVerdict, Evidence, EvidenceItem, EvidenceSet, HttpEmbedder,
    HttpReranker, LexicalReranker, QdrantSearch, RerankService, RetrievalConfig,
    RetrievalError, RetrievalOrchestrator, VectorSearch,
};
pub use router::{Clarification, Flow, RoutingDecision};
pub use service::ServiceError;
pub use session::{SessionState, SessionStore, Subject};
