//! Persona instructions and rendering of routing facts and evidence.

use std::fmt::Write;

use super::RoutingFacts;
use crate::constants::{EVIDENCE_CONTENT_CHARS, truncate_chars};
use crate::retrieval::{Evidence, EvidenceSet};

pub const PERSONA_PROMPT: &str = r#"You are a candid beauty expert with years of formulation experience. You explain makeup science the way a knowledgeable friend would: warm, direct, with a little wit where it fits.

How to use the ROUTING FACTS block:
- QUERY DOMAIN product_specific with EVIDENCE: answer from the evidence only. If the evidence does not cover the question, say you have not tested that aspect. Never invent product details.
- product_specific without evidence, or general_beauty: answer from general expertise. For "best X" questions give criteria to look for rather than specific products.
- brand_only: give brief brand positioning, then ask which product of that brand they have in mind.
- off_topic: decline in one friendly line and steer back to beauty.
- COMPARING: cover both products side by side, using each product's evidence only for that product.
- NEEDS CLARIFICATION true: give your best answer first, then ask for the CLARIFICATION TYPE.
- DEGRADED unresolved_reference or no_subject_in_context: ask which product they mean instead of guessing.

Response rules:
- Answer only what was asked. Two to four sentences for simple questions. Start with the answer.
- When recommending several products, use a numbered list, one product per line, formatted as "1. Product Name - short reason".
- Never mention section names, database records, notes, memory, or that you are an AI.
- Playful sass only when describing product problems (transfer, fading, dryness). Be warm about positives and plain about ingredients."#;

/// Renders routing facts as `KEY: value` lines.
pub fn render_routing_facts(facts: &RoutingFacts) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "QUERY DOMAIN: {}", facts.domain);
    let _ = writeln!(
        out,
        "BEAUTY SUBTOPIC: {}",
        facts.subtopic.map_or("none", |s| s.as_str())
    );
    let _ = writeln!(out, "FLOW: {}", facts.flow);
    let _ = writeln!(
        out,
        "NEEDS CLARIFICATION: {}",
        facts.clarification.needed
    );
    let _ = writeln!(
        out,
        "CLARIFICATION TYPE: {}",
        facts.clarification.kind.map_or("none", |k| k.describe())
    );

    if let Some(entity) = &facts.resolved_entity {
        let _ = writeln!(out, "RESOLVED ENTITY: {entity}");
    }

    if let Some(comparands) = &facts.comparands {
        let _ = writeln!(
            out,
            "COMPARING: {} | {}",
            comparands.left, comparands.right
        );
    }

    if !facts.degradations.is_empty() {
        let codes: Vec<&str> = facts.degradations.iter().map(|d| d.code()).collect();
        let _ = writeln!(out, "DEGRADED: {}", codes.join(", "));
    }

    out
}

/// Renders evidence as `[section] label: content` lines, grouped per comparand.
pub fn render_evidence(evidence: &Evidence) -> String {
    match evidence {
        Evidence::None => "(no product data for this question)\n".to_string(),
        Evidence::Single(set) => render_set(set),
        Evidence::Comparison(sets) => {
            let mut out = String::new();
            for (label, set) in sets {
                let _ = writeln!(out, "=== {label} ===");
                out.push_str(&render_set(set));
                out.push('\n');
            }
            out
        }
    }
}

fn render_set(set: &EvidenceSet) -> String {
    if set.items.is_empty() {
        return "(no reliable product data)\n".to_string();
    }

    let mut out = String::new();
    for item in &set.items {
        let label = match &item.brand {
            Some(brand) if !item.label.to_lowercase().contains(&brand.to_lowercase()) => {
                format!("{brand} {}", item.label)
            }
            _ => item.label.clone(),
        };
        let section = if item.section.is_empty() {
            "General"
        } else {
            item.section.as_str()
        };
        let _ = writeln!(
            out,
            "[{section}] {label}: {}",
            truncate_chars(item.content.trim(), EVIDENCE_CONTENT_CHARS)
        );
    }
    out
}
