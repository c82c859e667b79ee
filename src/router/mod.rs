//! Routing: a pure mapping from (intent, resolution) to one of four flows.
//!
//! | domain          | needs_retrieval | flow          |
//! |-----------------|-----------------|---------------|
//! | OffTopic        | any             | SkipOffTopic  |
//! | BrandOnly       | any             | SkipBrandOnly |
//! | GeneralBeauty   | any             | SkipGeneral   |
//! | ProductSpecific | false           | SkipGeneral   |
//! | ProductSpecific | true            | Retrieve      |
//!
//! Clarification flags pass through unchanged whatever the flow.


use std::fmt;

use crate::intent::{Category, ClarificationType, Domain, IntentRecord};
use crate::resolver::Resolution;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    SkipOffTopic,
    SkipBrandOnly,
    SkipGeneral,
    Retrieve,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::SkipOffTopic => "skip_retrieval_off_topic",
            Flow::SkipBrandOnly => "skip_retrieval_brand_only",
            Flow::SkipGeneral => "skip_retrieval_general",
            Flow::Retrieve => "retrieve",
        }
    }

    pub fn is_retrieve(&self) -> bool {
        matches!(self, Flow::Retrieve)
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Clarification {
    pub needed: bool,
    pub kind: Option<ClarificationType>,
}

impl Clarification {
    pub fn from_intent(intent: &IntentRecord) -> Self {
        Self {
            needed: intent.needs_clarification,
            kind: intent.clarification_type,
        }
    }

    pub fn required(kind: ClarificationType) -> Self {
        Self {
            needed: true,
            kind: Some(kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub flow: Flow,
    /// Present only when `flow` is [`Flow::Retrieve`].
    pub retrieval_query: Option<String>,
    pub category_filter: Option<Category>,
    pub carried_clarification: Clarification,
    /// `true` when a product-specific intent was demoted to the general flow.
    pub demoted: bool,
}

impl RoutingDecision {
    /// Overrides the decision to the general flow, dropping retrieval parameters.
    pub fn fall_back_to_general(&mut self) {
        self.flow = Flow::SkipGeneral;
        self.retrieval_query = None;
        self.category_filter = None;
    }
}

/// Transition table lookup.
pub fn select_flow(domain: Domain, needs_retrieval: bool) -> Flow {
    match (domain, needs_retrieval) {
        (Domain::OffTopic, _) => Flow::SkipOffTopic,
        (Domain::BrandOnly, _) => Flow::SkipBrandOnly,
        (Domain::GeneralBeauty, _) => Flow::SkipGeneral,
        (Domain::ProductSpecific, false) => Flow::SkipGeneral,
        (Domain::ProductSpecific, true) => Flow::Retrieve,
    }
}

/// Routes a classified, resolved query. Pure and deterministic.
pub fn route(intent: &IntentRecord, resolution: &Resolution) -> RoutingDecision {
    let flow = select_flow(intent.domain, intent.needs_retrieval);
    let retrieve = flow.is_retrieve();

    RoutingDecision {
        flow,
        retrieval_query: retrieve.then(|| resolution.resolved_query.clone()),
        category_filter: if retrieve { resolution.category } else { None },
        carried_clarification: Clarification::from_intent(intent),
        demoted: intent.domain == Domain::ProductSpecific && !intent.needs_retrieval,
    }
}
