//! Classifier instructions and request rendering.

use std::fmt::Write;

use super::classifier::ClassificationRequest;

pub const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You analyze user queries for a beauty and cosmetics product Q&A assistant.

Return ONLY a JSON object with these fields:
{
  "query_domain": "product_specific" | "general_beauty" | "brand_only" | "off_topic",
  "beauty_subtopic": "skincare" | "makeup" | "haircare" | "bath_body" | "ingredients" | "routines" | "tools_techniques" | null,
  "is_followup": bool,
  "needs_context": bool,
  "needs_retrieval": bool,
  "has_ordinal": bool,
  "needs_clarification": bool,
  "clarification_type": "skin_tone" | "skin_type" | "preference" | "budget" | "occasion" | null,
  "resolved_query": string,
  "detected_product": string | null,
  "detected_brand": string | null,
  "detected_category": string | null,
  "reasoning": string
}

query_domain:
- product_specific: the user asks about a specific product; product data is needed.
- general_beauty: beauty questions answerable from expertise alone.
- brand_only: a brand without a specific product.
- off_topic: not about beauty or personal care.

beauty_subtopic is only set for general_beauty.

needs_clarification is true for shade questions without the user's skin tone, "best X for me"
without skin type, and vague recommendation requests.

detected_category must be one of these keys or null:
lipstick, liquid_lipstick, lip_gloss, lip_liner, lip_balm_treatment, lip_stain_tint,
lip_plumper, lip_palette, foundation, concealer, blush, highlighter, tinted_moisturiser,
makeup_removers.
Never infer the category from a product name alone. Prefer the category under discussion
in the session. When uncertain, use null.

has_ordinal is true when the query points at an item of the current list by position
("the 2nd one", "the last one", "number 3").

Examples:
"Does MAC Ruby Woo transfer?" -> {"query_domain": "product_specific", "needs_retrieval": true}
"What does niacinamide do?" -> {"query_domain": "general_beauty", "beauty_subtopic": "ingredients", "needs_retrieval": false}
"Is MAC worth it?" -> {"query_domain": "brand_only", "needs_retrieval": false}
"What's the weather?" -> {"query_domain": "off_topic", "needs_retrieval": false}
"Best nude lipstick?" -> {"query_domain": "product_specific", "needs_clarification": true, "clarification_type": "skin_tone"}"#;

/// Renders the per-query user message: session context, current list, note preview, query.
pub fn render_classification_request(request: &ClassificationRequest) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "SESSION CONTEXT:\n{}\n", request.session_summary);

    out.push_str("CURRENT LIST (for ordinal resolution):\n");
    if request.reference_list.is_empty() {
        out.push_str("No list shown.\n");
    } else {
        if let Some(topic) = &request.reference_topic {
            let _ = writeln!(out, "Topic: {topic}");
        }
        for (idx, item) in request.reference_list.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", idx + 1, item);
        }
    }
    out.push('\n');

    if let Some(prior) = &request.prior_turn {
        let _ = writeln!(
            out,
            "PREVIOUS TURN:\nQ: {}\nA: {}\n",
            prior.query, prior.answer_preview
        );
    }

    if let Some(note) = &request.note_preview {
        let _ = writeln!(out, "MEMORY NOTES PREVIEW:\n{note}\n");
    }

    let _ = write!(out, "USER QUERY: \"{}\"", request.query);
    out
}
