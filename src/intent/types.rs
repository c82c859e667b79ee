use std::fmt;
use std::str::FromStr;

use super::category::Category;
use super::error::ClassificationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Coarse routing domain of a query. Closed set.
pub enum Domain {
    /// A specific product is being asked about.
    ProductSpecific,
    /// Beauty knowledge that does not need product data.
    GeneralBeauty,
    /// A brand without a specific product.
    BrandOnly,
    /// Not beauty related.
    OffTopic,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::ProductSpecific,
        Domain::GeneralBeauty,
        Domain::BrandOnly,
        Domain::OffTopic,
    ];

    /// Wire name used by the classification service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::ProductSpecific => "product_specific",
            Domain::GeneralBeauty => "general_beauty",
            Domain::BrandOnly => "brand_only",
            Domain::OffTopic => "off_topic",
        }
    }
}

impl FromStr for Domain {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| ClassificationError::UnknownValue {
                field: "query_domain",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Topic tag for general beauty questions.
pub enum Subtopic {
    Skincare,
    Makeup,
    Haircare,
    BathBody,
    Ingredients,
    Routines,
    ToolsTechniques,
}

impl Subtopic {
    pub const ALL: [Subtopic; 7] = [
        Subtopic::Skincare,
        Subtopic::Makeup,
        Subtopic::Haircare,
        Subtopic::BathBody,
        Subtopic::Ingredients,
        Subtopic::Routines,
        Subtopic::ToolsTechniques,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subtopic::Skincare => "skincare",
            Subtopic::Makeup => "makeup",
            Subtopic::Haircare => "haircare",
            Subtopic::BathBody => "bath_body",
            Subtopic::Ingredients => "ingredients",
            Subtopic::Routines => "routines",
            Subtopic::ToolsTechniques => "tools_techniques",
        }
    }
}

impl FromStr for Subtopic {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ClassificationError::UnknownValue {
                field: "beauty_subtopic",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Subtopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// What the answer should ask the user for.
pub enum ClarificationType {
    SkinTone,
    SkinType,
    Preference,
    Budget,
    Occasion,
    /// Which listed item or product the user meant. Raised by reference resolution,
    /// never accepted from the classifier.
    Reference,
}

impl ClarificationType {
    /// Values the classification service may emit.
    pub const CLASSIFIER_VALUES: [ClarificationType; 5] = [
        ClarificationType::SkinTone,
        ClarificationType::SkinType,
        ClarificationType::Preference,
        ClarificationType::Budget,
        ClarificationType::Occasion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClarificationType::SkinTone => "skin_tone",
            ClarificationType::SkinType => "skin_type",
            ClarificationType::Preference => "preference",
            ClarificationType::Budget => "budget",
            ClarificationType::Occasion => "occasion",
            ClarificationType::Reference => "reference",
        }
    }

    /// Human phrasing used in clarification prompts.
    pub fn describe(&self) -> &'static str {
        match self {
            ClarificationType::SkinTone => "skin tone",
            ClarificationType::SkinType => "skin type",
            ClarificationType::Preference => "preferences",
            ClarificationType::Budget => "budget",
            ClarificationType::Occasion => "occasion",
            ClarificationType::Reference => "which product you mean",
        }
    }
}

impl FromStr for ClarificationType {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CLASSIFIER_VALUES
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ClassificationError::UnknownValue {
                field: "clarification_type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for ClarificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Validated classification of a single query.
///
/// Detected strings are provisional: they only become session subject after reference
/// resolution accepts them.
pub struct IntentRecord {
    pub domain: Domain,
    /// Only set when `domain` is [`Domain::GeneralBeauty`].
    pub subtopic: Option<Subtopic>,
    pub is_followup: bool,
    pub needs_context: bool,
    pub needs_retrieval: bool,
    pub has_ordinal: bool,
    pub needs_clarification: bool,
    /// Only set when `needs_clarification` is true.
    pub clarification_type: Option<ClarificationType>,
    pub resolved_query_hint: Option<String>,
    pub detected_product: Option<String>,
    pub detected_brand: Option<String>,
    /// Always a member of the fixed category table; anything else is dropped while parsing.
    pub detected_category: Option<Category>,
    pub reasoning: Option<String>,
}

impl IntentRecord {
    /// A bare record for `domain` with every flag cleared.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            subtopic: None,
            is_followup: false,
            needs_context: false,
            needs_retrieval: false,
            has_ordinal: false,
            needs_clarification: false,
            clarification_type: None,
            resolved_query_hint: None,
            detected_product: None,
            detected_brand: None,
            detected_category: None,
            reasoning: None,
        }
    }

    /// Record used when classification failed: general flow, asking the user to clarify.
    pub fn degraded() -> Self {
        Self {
            needs_clarification: true,
            ..Self::new(Domain::GeneralBeauty)
        }
    }

    /// Returns `true` if the classifier named a product or brand explicitly.
    pub fn names_entity(&self) -> bool {
        self.detected_product.is_some() || self.detected_brand.is_some()
    }
}
