use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::rerank::{RerankService, sort_by_score};
use super::search::VectorSearch;
use super::types::EvidenceItem;
use crate::intent::Category;
use crate::service::ServiceError;

#[derive(Debug, Clone, PartialEq)]
/// A search call seen by [`MockVectorSearch`].
pub struct SearchCall {
    pub query: String,
    pub top_k: usize,
    pub category: Option<Category>,
}

/// Scripted vector search: the first rule whose needle appears in the query wins.
#[derive(Default)]
pub struct MockVectorSearch {
    rules: Vec<(String, Vec<EvidenceItem>)>,
    fail: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<SearchCall>>,
}

impl MockVectorSearch {
    /// Returns no candidates unless a rule matches.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Returns `items` for queries containing `needle` (case-insensitive).
    pub fn respond(mut self, needle: &str, items: Vec<EvidenceItem>) -> Self {
        self.rules.push((needle.to_lowercase(), items));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl VectorSearch for MockVectorSearch {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        category: Option<Category>,
    ) -> Result<Vec<EvidenceItem>, ServiceError> {
        self.calls.lock().push(SearchCall {
            query: query.to_string(),
            top_k,
            category,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(ServiceError::transport("vector_search", "mock failure"));
        }

        let query = query.to_lowercase();
        let mut items = self
            .rules
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, items)| items.clone())
            .unwrap_or_default();
        items.truncate(top_k);
        Ok(items)
    }
}

/// Reranker that assigns fixed scores by label and keeps the search score otherwise.
#[derive(Default)]
pub struct MockReranker {
    scores: HashMap<String, f32>,
    fail: bool,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl MockReranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn score(mut self, label: &str, score: f32) -> Self {
        self.scores.insert(label.to_string(), score);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl RerankService for MockReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut candidates: Vec<EvidenceItem>,
        top_n: usize,
    ) -> Result<Vec<EvidenceItem>, ServiceError> {
        *self.calls.lock() += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(ServiceError::transport("rerank", "mock failure"));
        }

        for item in &mut candidates {
            if let Some(score) = self.scores.get(&item.label) {
                item.score = *score;
            }
        }
        sort_by_score(&mut candidates);
        candidates.truncate(top_n);
        Ok(candidates)
    }
}
