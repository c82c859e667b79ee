//! Vector search: query embedding over HTTP, nearest neighbours from Qdrant.

use async_trait::async_trait;
use qdrant_client::Qdrant;
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::{Condition, Filter, ScoredPoint, SearchPointsBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::EvidenceItem;
use crate::intent::Category;
use crate::service::ServiceError;

const SEARCH: &str = "vector_search";
const EMBEDDING: &str = "embedding";

/// Payload key the category filter applies to.
pub const CATEGORY_FIELD: &str = "leaf_level_category";

#[async_trait]
/// External vector search service.
pub trait VectorSearch: Send + Sync {
    /// Returns up to `top_k` candidates ordered by similarity, best first.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        category: Option<Category>,
    ) -> Result<Vec<EvidenceItem>, ServiceError>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/v1/embeddings` client.
pub struct HttpEmbedder {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
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

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let mut request = self.http.post(&self.endpoint).json(&EmbedRequest {
            model: &self.model,
            input: vec![text],
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::transport(EMBEDDING, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::transport(
                EMBEDDING,
                format!("status {status}: {body}"),
            ));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::invalid(EMBEDDING, e.to_string()))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ServiceError::invalid(EMBEDDING, "no embedding in response"))
    }
}

/// Qdrant-backed product section search.
pub struct QdrantSearch {
    client: Qdrant,
    collection: String,
    embedder: HttpEmbedder,
}

impl QdrantSearch {
    /// Creates a client for `url`.
    pub fn new(
        url: &str,
        collection: impl Into<String>,
        embedder: HttpEmbedder,
    ) -> Result<Self, ServiceError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| ServiceError::transport(SEARCH, e))?;

        Ok(Self {
            client,
            collection: collection.into(),
            embedder,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl VectorSearch for QdrantSearch {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        category: Option<Category>,
    ) -> Result<Vec<EvidenceItem>, ServiceError> {
        let vector = self.embedder.embed(query).await?;

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k as u64).with_payload(true);

        if let Some(category) = category {
            let filter = Filter::must([Condition::matches(
                CATEGORY_FIELD,
                category.leaf().to_string(),
            )]);
            builder = builder.filter(filter);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| ServiceError::transport(SEARCH, e))?;

        let items: Vec<EvidenceItem> = response
            .result
            .into_iter()
            .filter_map(evidence_from_point)
            .collect();

        debug!(
            collection = %self.collection,
            candidates = items.len(),
            category = category.map(|c| c.key()),
            "vector search complete"
        );

        Ok(items)
    }
}

fn evidence_from_point(point: ScoredPoint) -> Option<EvidenceItem> {
    let id = match point.id.and_then(|pid| pid.point_id_options)? {
        PointIdOptions::Num(n) => n.to_string(),
        PointIdOptions::Uuid(s) => s,
    };

    let payload = point.payload;
    let text = |key: &str| {
        payload
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty())
    };

    let label = text("product_name").or_else(|| text("title"))?;
    let content = text("content").unwrap_or_default();
    let section = text("section_title").unwrap_or_default();

    let mut item = EvidenceItem::new(id, label, section, content, point.score);
    item.brand = text("brand");
    Some(item)
}
