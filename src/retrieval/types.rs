use std::fmt;

#[derive(Debug, Clone, PartialEq)]
/// One review section returned by search, scored by search and then by rerank.
pub struct EvidenceItem {
    pub id: String,
    /// Identifying label (product name).
    pub label: String,
    pub brand: Option<String>,
    /// Section title within the review the content came from.
    pub section: String,
    pub content: String,
    pub score: f32,
}

impl EvidenceItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        section: impl Into<String>,
        content: impl Into<String>,
        score: f32,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            brand: None,
            section: section.into(),
            content: content.into(),
            score,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// Text handed to the reranker for this item.
    pub fn rerank_text(&self) -> String {
        match &self.brand {
            Some(brand) => format!(
                "{} {} | {}: {}",
                brand, self.label, self.section, self.content
            ),
            None => format!("{} | {}: {}", self.label, self.section, self.content),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Outcome of the confidence gate.
pub enum ConfidenceVerdict {
    /// Evidence may be attached.
    Usable {
        /// Post-rerank score of the top item.
        top_score: f32,
        /// Accepted because the top label appears in the query.
        exact_match: bool,
    },
    /// Evidence is discarded and the turn answers from general knowledge.
    FallBackToGeneral {
        /// `None` when there were no candidates.
        top_score: Option<f32>,
    },
}

impl ConfidenceVerdict {
    pub fn is_usable(&self) -> bool {
        matches!(self, ConfidenceVerdict::Usable { .. })
    }

    pub fn score(&self) -> Option<f32> {
        match self {
            ConfidenceVerdict::Usable { top_score, .. } => Some(*top_score),
            ConfidenceVerdict::FallBackToGeneral { top_score } => *top_score,
        }
    }

    /// Returns a short debug string.
    pub fn debug_status(&self) -> &'static str {
        match self {
            ConfidenceVerdict::Usable {
                exact_match: true, ..
            } => "USABLE_EXACT",
            ConfidenceVerdict::Usable { .. } => "USABLE",
            ConfidenceVerdict::FallBackToGeneral { top_score: None } => "NO_CANDIDATES",
            ConfidenceVerdict::FallBackToGeneral { .. } => "LOW_CONFIDENCE",
        }
    }
}

impl fmt::Display for ConfidenceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceVerdict::Usable {
                top_score,
                exact_match,
            } => write!(
                f,
                "USABLE (top_score: {:.4}, exact_match: {})",
                top_score, exact_match
            ),
            ConfidenceVerdict::FallBackToGeneral {
                top_score: Some(score),
            } => write!(f, "FALL_BACK (top_score: {:.4})", score),
            ConfidenceVerdict::FallBackToGeneral { top_score: None } => {
                write!(f, "FALL_BACK (no candidates)")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Request-scoped result of one retrieval query. Never persisted.
pub struct EvidenceSet {
    pub query: String,
    /// Section-prioritized prefix of the reranked items. Empty unless usable.
    pub items: Vec<EvidenceItem>,
    pub verdict: ConfidenceVerdict,
}

impl EvidenceSet {
    pub fn is_usable(&self) -> bool {
        self.verdict.is_usable()
    }

    pub fn top_label(&self) -> Option<&str> {
        self.items.first().map(|item| item.label.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Evidence attached to a turn.
///
/// Comparison sets stay separate per comparand: their scores come from different
/// retrieval queries and are not comparable.
pub enum Evidence {
    #[default]
    None,
    Single(EvidenceSet),
    Comparison(Vec<(String, EvidenceSet)>),
}

impl Evidence {
    pub fn is_none(&self) -> bool {
        matches!(self, Evidence::None)
    }

    /// Total attached items across all sets.
    pub fn item_count(&self) -> usize {
        match self {
            Evidence::None => 0,
            Evidence::Single(set) => set.items.len(),
            Evidence::Comparison(sets) => sets.iter().map(|(_, set)| set.items.len()).sum(),
        }
    }

    /// Evidence set for a comparand label.
    pub fn for_comparand(&self, label: &str) -> Option<&EvidenceSet> {
        match self {
            Evidence::Comparison(sets) => sets
                .iter()
                .find(|(name, _)| name == label)
                .map(|(_, set)| set),
            _ => None,
        }
    }
}
