//! Classifier payload parsing and closed-set validation.

use serde::Deserialize;
use serde_json::{Value, json};

use super::category::Category;
use super::error::ClassificationError;
use super::types::{ClarificationType, Domain, IntentRecord, Subtopic};

#[derive(Debug, Deserialize)]
struct RawIntent {
    query_domain: Option<String>,
    beauty_subtopic: Option<String>,
    is_followup: Option<bool>,
    needs_context: Option<bool>,
    needs_retrieval: Option<bool>,
    has_ordinal: Option<bool>,
    needs_clarification: Option<bool>,
    clarification_type: Option<String>,
    resolved_query: Option<String>,
    detected_product: Option<String>,
    detected_brand: Option<String>,
    detected_category: Option<String>,
    reasoning: Option<String>,
}

/// Parses and validates a classifier payload.
///
/// Markdown code fences around the JSON are tolerated. Unknown domain, subtopic or
/// clarification values are errors; an unknown category is dropped.
pub fn parse_intent(payload: &str) -> Result<IntentRecord, ClassificationError> {
    let body = strip_code_fences(payload);
    let raw: RawIntent =
        serde_json::from_str(body).map_err(|e| ClassificationError::Malformed {
            message: e.to_string(),
        })?;

    let domain: Domain = non_empty(raw.query_domain)
        .ok_or(ClassificationError::MissingField {
            field: "query_domain",
        })?
        .to_lowercase()
        .parse()?;

    let subtopic = non_empty(raw.beauty_subtopic)
        .map(|s| s.to_lowercase().parse::<Subtopic>())
        .transpose()?
        .filter(|_| domain == Domain::GeneralBeauty);

    let needs_clarification = raw.needs_clarification.unwrap_or(false);
    let clarification_type = non_empty(raw.clarification_type)
        .map(|s| s.to_lowercase().parse::<ClarificationType>())
        .transpose()?
        .filter(|_| needs_clarification);

    let detected_category = non_empty(raw.detected_category).and_then(|raw_category| {
        let category = Category::from_key(&raw_category);
        if category.is_none() {
            tracing::debug!(value = %raw_category, "dropping unknown category from classifier");
        }
        category
    });

    Ok(IntentRecord {
        domain,
        subtopic,
        is_followup: raw.is_followup.unwrap_or(false),
        needs_context: raw.needs_context.unwrap_or(false),
        needs_retrieval: raw.needs_retrieval.unwrap_or(false),
        has_ordinal: raw.has_ordinal.unwrap_or(false),
        needs_clarification,
        clarification_type,
        resolved_query_hint: non_empty(raw.resolved_query),
        detected_product: non_empty(raw.detected_product),
        detected_brand: non_empty(raw.detected_brand),
        detected_category,
        reasoning: non_empty(raw.reasoning),
    })
}

/// Renders a record back into the classifier wire shape.
pub fn intent_to_payload(intent: &IntentRecord) -> Value {
    json!({
        "query_domain": intent.domain.as_str(),
        "beauty_subtopic": intent.subtopic.map(|s| s.as_str()),
        "is_followup": intent.is_followup,
        "needs_context": intent.needs_context,
        "needs_retrieval": intent.needs_retrieval,
        "has_ordinal": intent.has_ordinal,
        "needs_clarification": intent.needs_clarification,
        "clarification_type": intent.clarification_type.map(|c| c.as_str()),
        "resolved_query": intent.resolved_query_hint,
        "detected_product": intent.detected_product,
        "detected_brand": intent.detected_brand,
        "detected_category": intent.detected_category.map(|c| c.key()),
        "reasoning": intent.reasoning,
    })
}

/// Strips a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null") && !v.eq_ignore_ascii_case("none"))
}
