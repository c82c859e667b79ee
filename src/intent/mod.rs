//! Intent classification adapter.
//!
//! The classification service is a black box that returns a structured payload;
//! this module owns the closed sets ([`Domain`], [`Subtopic`], [`ClarificationType`],
//! [`Category`]) and rejects anything outside them.

pub mod category;
pub mod classifier;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use category::{CATEGORY_TABLE, Category, CategoryInfo};
pub use classifier::{
    ClassificationRequest, ClassificationService, GenaiClassifier, IntentClassifier, PriorTurn,
};
pub use error::ClassificationError;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockClassifier;
pub use parse::{intent_to_payload, parse_intent, strip_code_fences};
pub use types::{ClarificationType, Domain, IntentRecord, Subtopic};
