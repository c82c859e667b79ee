use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::config::RetrievalConfig;
use super::error::RetrievalError;
use super::gate::ConfidenceGate;
use super::rerank::RerankService;
use super::search::VectorSearch;
use super::sections::prioritize;
use super::types::EvidenceSet;
use crate::comparison::Comparands;
use crate::intent::Category;
use crate::service::with_timeout;

/// Evidence (or failure) for one comparand, keyed by its label.
pub type ComparandResult = (String, Result<EvidenceSet, RetrievalError>);

/// Search, rerank, gate, then section-order the survivors.
pub struct RetrievalOrchestrator {
    search: Arc<dyn VectorSearch>,
    reranker: Arc<dyn RerankService>,
    gate: ConfidenceGate,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    pub fn new(
        search: Arc<dyn VectorSearch>,
        reranker: Arc<dyn RerankService>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            search,
            reranker,
            gate: ConfidenceGate::new(config.confidence_threshold),
            config,
        }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Single-subject retrieval.
    #[instrument(skip_all, fields(query_len = query.len(), category = category.map(|c| c.key())))]
    pub async fn retrieve(
        &self,
        query: &str,
        category: Option<Category>,
    ) -> Result<EvidenceSet, RetrievalError> {
        self.run(query, category, self.config.top_k).await
    }

    /// Retrieves each comparand independently and concurrently, without a category filter.
    ///
    /// Results are returned in comparand order and never merged.
    #[instrument(skip_all, fields(left = %comparands.left, right = %comparands.right))]
    pub async fn retrieve_comparison(&self, comparands: &Comparands) -> [ComparandResult; 2] {
        let top_k = self.config.compare_top_k;
        let (left, right) = tokio::join!(
            self.run(&comparands.left, None, top_k),
            self.run(&comparands.right, None, top_k),
        );

        [
            (comparands.left.clone(), left),
            (comparands.right.clone(), right),
        ]
    }

    async fn run(
        &self,
        query: &str,
        category: Option<Category>,
        top_k: usize,
    ) -> Result<EvidenceSet, RetrievalError> {
        let timeout = self.config.call_timeout;

        let candidates = with_timeout(
            "vector_search",
            timeout,
            self.search.search(query, top_k, category),
        )
        .await
        .map_err(|source| RetrievalError::Search { source })?;

        debug!(candidates = candidates.len(), top_k, "search returned");

        let reranked = if candidates.is_empty() {
            candidates
        } else {
            with_timeout(
                "rerank",
                timeout,
                self.reranker.rerank(query, candidates, self.config.top_n),
            )
            .await
            .map_err(|source| RetrievalError::Rerank { source })?
        };

        let verdict = self.gate.evaluate(query, &reranked);

        info!(
            verdict = verdict.debug_status(),
            top_score = verdict.score(),
            threshold = self.gate.threshold(),
            candidates = reranked.len(),
            "confidence gate"
        );

        let items = if verdict.is_usable() {
            prioritize(reranked, query, self.config.evidence_limit)
        } else {
            Vec::new()
        };

        Ok(EvidenceSet {
            query: query.to_string(),
            items,
            verdict,
        })
    }
}
