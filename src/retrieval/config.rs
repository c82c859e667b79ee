use std::time::Duration;

use crate::config::Config;
use crate::constants::{
    DEFAULT_CALL_TIMEOUT, DEFAULT_COMPARE_TOP_K, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_EVIDENCE_LIMIT, DEFAULT_TOP_K, DEFAULT_TOP_N,
};

#[derive(Debug, Clone)]
/// Sizes, threshold and deadline used by the retrieval orchestrator.
pub struct RetrievalConfig {
    pub top_k: usize,
    /// Per-comparand candidate count for comparison queries.
    pub compare_top_k: usize,
    pub top_n: usize,
    pub evidence_limit: usize,
    pub confidence_threshold: f32,
    /// Deadline applied to each search and each rerank call.
    pub call_timeout: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            compare_top_k: DEFAULT_COMPARE_TOP_K,
            top_n: DEFAULT_TOP_N,
            evidence_limit: DEFAULT_EVIDENCE_LIMIT,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl From<&Config> for RetrievalConfig {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.top_k,
            compare_top_k: config.compare_top_k,
            top_n: config.top_n,
            evidence_limit: config.evidence_limit,
            confidence_threshold: config.confidence_threshold,
            call_timeout: config.call_timeout,
        }
    }
}

impl RetrievalConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_evidence_limit(mut self, limit: usize) -> Self {
        self.evidence_limit = limit;
        self
    }
}
