use std::fmt;

use crate::comparison::ComparisonPattern;
use crate::composer::AnswerSource;
use crate::intent::IntentRecord;
use crate::resolver::UnresolvedReason;
use crate::retrieval::Evidence;
use crate::router::RoutingDecision;

#[derive(Debug, Clone, PartialEq)]
/// A recoverable failure absorbed by degrading the turn.
pub enum Degradation {
    /// Classification failed or returned an invalid payload; the turn ran as general.
    ClassificationInvalid { reason: String },
    /// An ordinal could not be mapped to the reference list.
    UnresolvedReference {
        phrase: String,
        reason: UnresolvedReason,
    },
    /// Follow-up with no subject in the session.
    NoSubjectInContext,
    /// A comparison pattern matched with an empty side; retrieved as a single subject.
    EmptyComparand { pattern: ComparisonPattern },
    /// Evidence failed the confidence gate.
    LowConfidence {
        comparand: Option<String>,
        top_score: Option<f32>,
    },
    /// Search or rerank failed or timed out.
    RetrievalUnavailable {
        comparand: Option<String>,
        reason: String,
    },
}

impl Degradation {
    /// Stable snake_case code, shown to the generator and in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Degradation::ClassificationInvalid { .. } => "classification_invalid",
            Degradation::UnresolvedReference { .. } => "unresolved_reference",
            Degradation::NoSubjectInContext => "no_subject_in_context",
            Degradation::EmptyComparand { .. } => "empty_comparand",
            Degradation::LowConfidence { .. } => "low_confidence",
            Degradation::RetrievalUnavailable { .. } => "retrieval_unavailable",
        }
    }

    /// Returns `true` if the answer should ask the user which product they meant.
    pub fn asks_for_reference(&self) -> bool {
        matches!(
            self,
            Degradation::UnresolvedReference { .. } | Degradation::NoSubjectInContext
        )
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Degradation::ClassificationInvalid { reason } => {
                write!(f, "classification invalid: {reason}")
            }
            Degradation::UnresolvedReference { phrase, reason } => {
                write!(f, "unresolved reference '{phrase}': {reason}")
            }
            Degradation::NoSubjectInContext => write!(f, "no subject in context"),
            Degradation::EmptyComparand { pattern } => {
                write!(f, "empty comparand for {pattern} pattern")
            }
            Degradation::LowConfidence {
                comparand,
                top_score,
            } => {
                write!(f, "low confidence")?;
                if let Some(comparand) = comparand {
                    write!(f, " for '{comparand}'")?;
                }
                match top_score {
                    Some(score) => write!(f, " (top_score: {score:.4})"),
                    None => write!(f, " (no candidates)"),
                }
            }
            Degradation::RetrievalUnavailable { comparand, reason } => match comparand {
                Some(comparand) => write!(f, "retrieval unavailable for '{comparand}': {reason}"),
                None => write!(f, "retrieval unavailable: {reason}"),
            },
        }
    }
}

#[derive(Debug, Clone)]
/// Result of a successful turn.
pub struct TurnOutcome {
    pub session_id: String,
    /// 1-based turn number recorded in the session.
    pub turn: u64,
    pub answer: String,
    pub source: AnswerSource,
    pub intent: IntentRecord,
    /// Final decision, after any fall back to the general flow.
    pub decision: RoutingDecision,
    pub resolved_query: String,
    pub resolved_entity: Option<String>,
    pub evidence: Evidence,
    pub degradations: Vec<Degradation>,
    /// Reference list recorded for the next turn. Empty when the answer showed no list.
    pub reference_list: Vec<String>,
}

impl TurnOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }

    pub fn has(&self, code: &str) -> bool {
        self.degradations.iter().any(|d| d.code() == code)
    }
}
