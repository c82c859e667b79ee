//! Session state store.
//!
//! Per-session conversational memory: current subject, the reference list used for
//! ordinal resolution, a rolling summary, and the note index. A reference list remembers
//! the subject generation it was shown under; once the subject moves on, ordinals
//! against it fail closed.

pub mod state;
pub mod store;
pub mod types;


pub use state::{EMPTY_SUMMARY, SessionState};
pub use store::{SessionHandle, SessionStore};
pub use types::{
    CompletedTurn, ListUpdate, ReferenceList, SessionUpdate, Subject, TurnRecord,
};
