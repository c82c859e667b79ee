//! Fixed product category table.
//!
//! The classifier's `detected_category` is only ever trusted through [`Category::from_key`];
//! unknown keys normalize to `None`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Lipstick,
    LiquidLipstick,
    LipGloss,
    LipLiner,
    LipBalmTreatment,
    LipStainTint,
    LipPlumper,
    LipPalette,
    Foundation,
    Concealer,
    Blush,
    Highlighter,
    TintedMoisturiser,
    MakeupRemovers,
}

/// Taxonomy path of a category in the product index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    pub category: Category,
    /// Classifier wire key.
    pub key: &'static str,
    pub top_level: &'static str,
    pub sub_level: Option<&'static str>,
    /// Leaf label stored on indexed documents; used as the search filter value.
    pub leaf: &'static str,
}

/// Indexed by `Category as usize`.
pub static CATEGORY_TABLE: [CategoryInfo; 14] = [
    CategoryInfo {
        category: Category::Lipstick,
        key: "lipstick",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lipstick",
    },
    CategoryInfo {
        category: Category::LiquidLipstick,
        key: "liquid_lipstick",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Liquid Lipstick",
    },
    CategoryInfo {
        category: Category::LipGloss,
        key: "lip_gloss",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lip Gloss",
    },
    CategoryInfo {
        category: Category::LipLiner,
        key: "lip_liner",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lip Liner",
    },
    CategoryInfo {
        category: Category::LipBalmTreatment,
        key: "lip_balm_treatment",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lip Balm & Treatment",
    },
    CategoryInfo {
        category: Category::LipStainTint,
        key: "lip_stain_tint",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lip Stain & Tint",
    },
    CategoryInfo {
        category: Category::LipPlumper,
        key: "lip_plumper",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lip Plumper",
    },
    CategoryInfo {
        category: Category::LipPalette,
        key: "lip_palette",
        top_level: "Makeup",
        sub_level: Some("Lip"),
        leaf: "Lip Palette",
    },
    CategoryInfo {
        category: Category::Foundation,
        key: "foundation",
        top_level: "Makeup",
        sub_level: Some("Face"),
        leaf: "Foundation",
    },
    CategoryInfo {
        category: Category::Concealer,
        key: "concealer",
        top_level: "Makeup",
        sub_level: Some("Face"),
        leaf: "Concealer",
    },
    CategoryInfo {
        category: Category::Blush,
        key: "blush",
        top_level: "Makeup",
        sub_level: Some("Face"),
        leaf: "Blush",
    },
    CategoryInfo {
        category: Category::Highlighter,
        key: "highlighter",
        top_level: "Makeup",
        sub_level: Some("Face"),
        leaf: "Highlighter",
    },
    CategoryInfo {
        category: Category::TintedMoisturiser,
        key: "tinted_moisturiser",
        top_level: "Makeup",
        sub_level: Some("Face"),
        leaf: "Tinted Moisturiser",
    },
    CategoryInfo {
        category: Category::MakeupRemovers,
        key: "makeup_removers",
        top_level: "Cleanser",
        sub_level: None,
        leaf: "Makeup Removers",
    },
];

impl Category {
    /// Looks up a classifier key. Case, surrounding whitespace, spaces and hyphens are
    /// tolerated (`"Lip Gloss"` → `lip_gloss`); any other spelling is rejected.
    pub fn from_key(raw: &str) -> Option<Self> {
        let key: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        CATEGORY_TABLE
            .iter()
            .find(|info| info.key == key)
            .map(|info| info.category)
    }

    pub fn info(self) -> &'static CategoryInfo {
        &CATEGORY_TABLE[self as usize]
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn leaf(self) -> &'static str {
        self.info().leaf
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
