//! Confidence gate over reranked evidence.

use tracing::debug;

use super::types::{ConfidenceVerdict, EvidenceItem};

#[derive(Debug, Clone, Copy)]
pub struct ConfidenceGate {
    threshold: f32,
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Judges `items` (reranked, best first) for `query`.
    ///
    /// Usable when the top score meets the threshold, or when the top label appears in
    /// the query (case-insensitive) whatever its score. Empty input always falls back.
    pub fn evaluate(&self, query: &str, items: &[EvidenceItem]) -> ConfidenceVerdict {
        let Some(top) = items.first() else {
            return ConfidenceVerdict::FallBackToGeneral { top_score: None };
        };

        let exact_match = label_in_query(&top.label, query);

        if top.score >= self.threshold || exact_match {
            debug!(
                top_score = top.score,
                threshold = self.threshold,
                exact_match,
                "evidence accepted"
            );
            ConfidenceVerdict::Usable {
                top_score: top.score,
                exact_match,
            }
        } else {
            debug!(
                top_score = top.score,
                threshold = self.threshold,
                "evidence below threshold"
            );
            ConfidenceVerdict::FallBackToGeneral {
                top_score: Some(top.score),
            }
        }
    }
}

fn label_in_query(label: &str, query: &str) -> bool {
    let label = label.trim().to_lowercase();
    !label.is_empty() && query.to_lowercase().contains(&label)
}
