//! Reranking: a Cohere-compatible HTTP endpoint, or a lexical scorer when none is configured.

use std::cmp::Ordering;
use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::EvidenceItem;
use crate::service::ServiceError;

const RERANK: &str = "rerank";

#[async_trait]
/// External reranking service.
pub trait RerankService: Send + Sync {
    /// Rescores `candidates` against `query`; returns at most `top_n`, best first.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<EvidenceItem>,
        top_n: usize,
    ) -> Result<Vec<EvidenceItem>, ServiceError>;
}

/// Sorts by score descending. Stable, so equal scores keep their input order.
pub fn sort_by_score(items: &mut [EvidenceItem]) {
    items.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: Vec<String>,
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

/// Client for a `/v2/rerank` endpoint.
pub struct HttpReranker {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpReranker {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
        }
    }
}

#[async_trait]
impl RerankService for HttpReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<EvidenceItem>,
        top_n: usize,
    ) -> Result<Vec<EvidenceItem>, ServiceError> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        let body = RerankRequest {
            model: &self.model,
            query,
            documents: candidates.iter().map(EvidenceItem::rerank_text).collect(),
            top_n: top_n.min(candidates.len()),
        };

        let mut request = self.http.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::transport(RERANK, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::transport(
                RERANK,
                format!("status {status}: {body}"),
            ));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::invalid(RERANK, e.to_string()))?;

        let mut slots: Vec<Option<EvidenceItem>> = candidates.into_iter().map(Some).collect();
        let mut ranked = Vec::with_capacity(parsed.results.len());
        for result in parsed.results {
            if let Some(mut item) = slots.get_mut(result.index).and_then(Option::take) {
                item.score = result.relevance_score;
                ranked.push(item);
            }
        }

        sort_by_score(&mut ranked);
        ranked.truncate(top_n);

        debug!(kept = ranked.len(), "rerank complete");
        Ok(ranked)
    }
}

/// Word-overlap reranker for deployments without a rerank endpoint.
///
/// Stop words are ignored. Score is `0.6 * recall + 0.4 * jaccard` pushed through a
/// logistic curve centred on 0.5, so it lands in `[0, 1]` like a cross-encoder's.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexicalReranker;

impl LexicalReranker {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, query: &str, candidate: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let query_words = content_words(&query_lower);

        let candidate_lower = candidate.to_lowercase();
        let candidate_words = content_words(&candidate_lower);

        if query_words.is_empty() {
            let len_ratio = (query.len().min(candidate.len()) as f32)
                / (query.len().max(candidate.len()).max(1) as f32);
            return len_ratio * 0.3;
        }

        let matches = query_words.intersection(&candidate_words).count();
        let recall = matches as f32 / query_words.len() as f32;

        let union = query_words.union(&candidate_words).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base_score = 0.6 * recall + 0.4 * jaccard;
        let normalized = 1.0 / (1.0 + (-8.0 * (base_score - 0.5)).exp());

        normalized.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl RerankService for LexicalReranker {
    async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<EvidenceItem>,
        top_n: usize,
    ) -> Result<Vec<EvidenceItem>, ServiceError> {
        for item in &mut candidates {
            item.score = self.score(query, &item.rerank_text());
        }
        sort_by_score(&mut candidates);
        candidates.truncate(top_n);
        Ok(candidates)
    }
}

static STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "shall",
    "can", "need", "to", "of", "in", "for", "on", "with", "at", "by", "from", "as", "into",
    "about", "how", "what", "which", "who", "when", "where", "why", "all", "each", "more",
    "most", "some", "such", "no", "not", "only", "so", "than", "too", "very", "just", "and",
    "but", "if", "or", "this", "that", "these", "those", "am", "it", "its", "i", "me", "my",
    "you", "your", "tell",
];

fn content_words(text: &str) -> HashSet<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
        .collect()
}
