//! Retrieval orchestration.
//!
//! For each retrieval query: vector search for `top_k` candidates (optionally filtered by
//! category), rerank down to `top_n`, pass the result through the [`ConfidenceGate`], and
//! reorder accepted items by section priority. Comparisons run one pipeline per comparand
//! concurrently and keep the results apart.

pub mod config;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod rerank;
pub mod search;
pub mod sections;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use config::RetrievalConfig;
pub use error::RetrievalError;
pub use gate::ConfidenceGate;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockReranker, MockVectorSearch, SearchCall};
pub use orchestrator::{ComparandResult, RetrievalOrchestrator};
pub use rerank::{HttpReranker, LexicalReranker, RerankService};
pub use search::{HttpEmbedder, QdrantSearch, VectorSearch};
pub use sections::{DEFAULT_SECTION_ORDER, SECTION_PRIORITY, prioritize};
pub use types::{ConfidenceVerdict, Evidence, EvidenceItem, EvidenceSet};
