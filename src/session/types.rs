use chrono::{DateTime, Utc};

use crate::intent::Category;
use crate::notes::NoteRef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// The product, brand and category the conversation is currently about.
pub struct Subject {
    pub product: Option<String>,
    pub brand: Option<String>,
    pub category: Option<Category>,
}

impl Subject {
    pub fn product(name: impl Into<String>) -> Self {
        Self {
            product: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_brand(mut self, brand: Option<String>) -> Self {
        self.brand = brand;
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_none() && self.brand.is_none() && self.category.is_none()
    }

    /// Name to search for: brand and product, without repeating a brand already in the
    /// product name.
    pub fn display_name(&self) -> Option<String> {
        match (&self.brand, &self.product) {
            (Some(brand), Some(product))
                if !product.to_lowercase().contains(&brand.to_lowercase()) =>
            {
                Some(format!("{brand} {product}"))
            }
            (_, Some(product)) => Some(product.clone()),
            (Some(brand), None) => Some(brand.clone()),
            (None, None) => None,
        }
    }

    /// Case-insensitive identity comparison, used to detect subject changes.
    pub fn same_as(&self, other: &Subject) -> bool {
        fn norm(value: &Option<String>) -> Option<String> {
            value.as_ref().map(|v| v.trim().to_lowercase())
        }
        norm(&self.product) == norm(&other.product)
            && norm(&self.brand) == norm(&other.brand)
            && self.category == other.category
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Entities shown to the user in the last list-producing answer (1-based for ordinals).
pub struct ReferenceList {
    items: Vec<String>,
    topic: Option<String>,
    subject_generation: u64,
}

impl ReferenceList {
    pub(crate) fn new(items: Vec<String>, topic: Option<String>, subject_generation: u64) -> Self {
        Self {
            items,
            topic,
            subject_generation,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the entry at 1-based `index`. Zero and out-of-range indices yield `None`.
    pub fn get(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
    }

    /// Note topic the list was saved under, if any.
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Subject generation the list was recorded under.
    pub fn subject_generation(&self) -> u64 {
        self.subject_generation
    }

    /// Returns `true` if `name` is one of the items (case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.eq_ignore_ascii_case(name.trim()))
    }

    pub(crate) fn restamp(&mut self, subject_generation: u64) {
        self.subject_generation = subject_generation;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One committed turn in the history ring.
pub struct TurnRecord {
    pub turn: u64,
    pub query: String,
    pub answer_preview: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Replacement policy for the reference list.
pub enum ListUpdate {
    /// Replace wholesale. An empty `items` behaves like [`ListUpdate::Clear`].
    Replace {
        items: Vec<String>,
        topic: Option<String>,
    },
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTurn {
    pub query: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default)]
/// Partial session update. `None` fields leave state unchanged.
///
/// Applied in order: subject, reference list, turn, notes. A list replaced in the same
/// update as a subject change is therefore recorded against the new subject.
pub struct SessionUpdate {
    pub subject: Option<Subject>,
    pub reference_list: Option<ListUpdate>,
    pub turn: Option<CompletedTurn>,
    pub notes: Vec<NoteRef>,
}

impl SessionUpdate {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
            && self.reference_list.is_none()
            && self.turn.is_none()
            && self.notes.is_empty()
    }
}
