//! Reference resolution.
//!
//! Turns ordinal references ("the 2nd one") and bare follow-ups ("does it transfer?") into
//! concrete entities using the session's reference list and current subject. Resolution
//! never guesses: a missing, stale or too-short list is an error the caller turns into a
//! clarification request.
//!
//! Category comes from the classifier (this turn or an earlier one) only. Product names are
//! never mined for category words.

pub mod error;
pub mod ordinal;


pub use error::{ResolveError, UnresolvedReason};
pub use ordinal::{OrdinalMatch, OrdinalPosition, find_ordinal, substitute};

use tracing::debug;

use crate::intent::{Category, IntentRecord};
use crate::session::{SessionState, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the resolved query was obtained.
pub enum ResolutionSource {
    /// Picked from the reference list (1-based index).
    Ordinal { index: usize },
    /// Current subject substituted into a follow-up.
    Followup,
    /// The classifier named the entity.
    Explicit,
    /// Nothing to resolve.
    Passthrough,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub resolved_query: String,
    pub resolved_entity: Option<String>,
    /// Subject to record at the end of the turn, if this turn establishes one.
    pub subject: Option<Subject>,
    /// Category filter for retrieval.
    pub category: Option<Category>,
    pub source: ResolutionSource,
}

impl Resolution {
    /// The raw query, unresolved.
    pub fn passthrough(query: &str, category: Option<Category>) -> Self {
        Self {
            resolved_query: query.to_string(),
            resolved_entity: None,
            subject: category.map(|c| Subject::default().with_category(Some(c))),
            category,
            source: ResolutionSource::Passthrough,
        }
    }
}

/// Resolves ordinal and follow-up references in `query` against `state`.
pub fn resolve(
    query: &str,
    intent: &IntentRecord,
    state: &SessionState,
) -> Result<Resolution, ResolveError> {
    if intent.has_ordinal {
        match find_ordinal(query) {
            Some(ordinal) => return resolve_ordinal(query, &ordinal, intent, state),
            None => debug!("ordinal flagged but no ordinal phrase found"),
        }
    }

    if intent.is_followup && !intent.names_entity() {
        return resolve_followup(query, intent, state);
    }

    if intent.names_entity() {
        let subject = Subject {
            product: intent.detected_product.clone(),
            brand: intent.detected_brand.clone(),
            category: intent.detected_category,
        };
        return Ok(Resolution {
            resolved_query: hint_or_query(intent, query),
            resolved_entity: subject.display_name(),
            subject: Some(subject),
            category: intent.detected_category,
            source: ResolutionSource::Explicit,
        });
    }

    let mut resolution = Resolution::passthrough(query, intent.detected_category);
    resolution.resolved_query = hint_or_query(intent, query);
    Ok(resolution)
}

fn resolve_ordinal(
    query: &str,
    ordinal: &OrdinalMatch,
    intent: &IntentRecord,
    state: &SessionState,
) -> Result<Resolution, ResolveError> {
    let unresolved = |reason| ResolveError::UnresolvedReference {
        phrase: ordinal.phrase.clone(),
        reason,
    };

    let list = state
        .reference_list()
        .filter(|list| !list.is_empty())
        .ok_or_else(|| unresolved(UnresolvedReason::NoList))?;

    if state.reference_list_is_stale() {
        return Err(unresolved(UnresolvedReason::StaleList));
    }

    let index = ordinal.position.to_index(list.len());
    let entity = list.get(index).ok_or_else(|| {
        unresolved(UnresolvedReason::OutOfRange {
            index,
            len: list.len(),
        })
    })?;

    let category = intent
        .detected_category
        .or_else(|| state.current_subject().and_then(|s| s.category));

    debug!(index, entity, "resolved ordinal reference");

    Ok(Resolution {
        resolved_query: substitute(query, ordinal, entity),
        resolved_entity: Some(entity.to_string()),
        subject: Some(Subject::product(entity).with_category(category)),
        category,
        source: ResolutionSource::Ordinal { index },
    })
}

fn resolve_followup(
    query: &str,
    intent: &IntentRecord,
    state: &SessionState,
) -> Result<Resolution, ResolveError> {
    let subject = state
        .current_subject()
        .filter(|s| !s.is_empty())
        .ok_or(ResolveError::NoSubjectInContext)?;

    let category = intent.detected_category.or(subject.category);
    let entity = subject.display_name();
    let name = entity
        .clone()
        .or_else(|| category.map(|c| c.leaf().to_string()))
        .ok_or(ResolveError::NoSubjectInContext)?;

    let resolved_query = if query.to_lowercase().contains(&name.to_lowercase()) {
        query.to_string()
    } else {
        format!("{name} {query}")
    };

    debug!(subject = %name, "resolved follow-up against current subject");

    Ok(Resolution {
        resolved_query,
        resolved_entity: entity,
        subject: Some(subject.clone().with_category(category)),
        category,
        source: ResolutionSource::Followup,
    })
}

fn hint_or_query(intent: &IntentRecord, query: &str) -> String {
    intent
        .resolved_query_hint
        .clone()
        .unwrap_or_else(|| query.to_string())
}
