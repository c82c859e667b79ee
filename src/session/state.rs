use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;

use chrono::{DateTime, Utc};

use super::types::{
    CompletedTurn, ListUpdate, ReferenceList, SessionUpdate, Subject, TurnRecord,
};
use crate::constants::{
    ANSWER_PREVIEW_CHARS, MAX_HISTORY_TURNS, MAX_SUMMARY_CHARS, QUERY_PREVIEW_CHARS,
    SUMMARY_RECENT_TURNS, truncate_chars,
};
use crate::notes::NoteRef;

pub const EMPTY_SUMMARY: &str = "No previous context available.";

#[derive(Debug, Clone)]
/// Conversational memory for one session.
///
/// The engine holds the session lock for the whole turn and mutates the state only once,
/// by applying a [`SessionUpdate`] after generation succeeded.
pub struct SessionState {
    session_id: String,
    current_subject: Option<Subject>,
    subject_generation: u64,
    reference_list: Option<ReferenceList>,
    summary: String,
    last_query: Option<String>,
    last_answer_preview: Option<String>,
    history: VecDeque<TurnRecord>,
    notes_index: BTreeMap<String, NoteRef>,
    turn_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            current_subject: None,
            subject_generation: 0,
            reference_list: None,
            summary: EMPTY_SUMMARY.to_string(),
            last_query: None,
            last_answer_preview: None,
            history: VecDeque::with_capacity(MAX_HISTORY_TURNS),
            notes_index: BTreeMap::new(),
            turn_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn current_subject(&self) -> Option<&Subject> {
        self.current_subject.as_ref()
    }

    /// Incremented every time the subject changes identity.
    pub fn subject_generation(&self) -> u64 {
        self.subject_generation
    }

    pub fn reference_list(&self) -> Option<&ReferenceList> {
        self.reference_list.as_ref()
    }

    /// `true` when the subject changed after the current list was shown.
    pub fn reference_list_is_stale(&self) -> bool {
        self.reference_list
            .as_ref()
            .is_some_and(|list| list.subject_generation() != self.subject_generation)
    }

    /// Stored digest, refreshed whenever a turn or subject is recorded.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_answer_preview(&self) -> Option<&str> {
        self.last_answer_preview.as_deref()
    }

    pub fn history(&self) -> impl Iterator<Item = &TurnRecord> {
        self.history.iter()
    }

    pub fn notes_index(&self) -> &BTreeMap<String, NoteRef> {
        &self.notes_index
    }

    pub fn note_ref(&self, topic: &str) -> Option<&NoteRef> {
        self.notes_index.get(topic)
    }

    pub fn turn_count(&self) -> u64 {
        self.turn_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sets the current subject. An empty subject is ignored; an identical one keeps the
    /// generation so the reference list stays valid. Moving to an item of the reference
    /// list also keeps the list valid.
    pub fn set_subject(&mut self, subject: Subject) {
        if subject.is_empty() {
            return;
        }
        let changed = self
            .current_subject
            .as_ref()
            .is_none_or(|current| !current.same_as(&subject));
        if changed {
            self.subject_generation += 1;
            let generation = self.subject_generation;
            if let (Some(list), Some(product)) = (self.reference_list.as_mut(), &subject.product)
                && list.contains(product)
            {
                list.restamp(generation);
            }
        }
        self.current_subject = Some(subject);
        self.touch();
    }

    /// Replaces the reference list wholesale. An empty list clears it.
    pub fn record_reference_list(&mut self, items: Vec<String>, topic: Option<String>) {
        self.reference_list = if items.is_empty() {
            None
        } else {
            Some(ReferenceList::new(items, topic, self.subject_generation))
        };
        self.touch();
    }

    pub fn clear_reference_list(&mut self) {
        self.reference_list = None;
        self.touch();
    }

    /// Appends a completed turn to history and refreshes the previews and summary.
    pub fn record_turn(&mut self, query: &str, answer: &str) {
        self.turn_count += 1;
        self.history.push_back(TurnRecord {
            turn: self.turn_count,
            query: truncate_chars(query, QUERY_PREVIEW_CHARS),
            answer_preview: truncate_chars(answer, ANSWER_PREVIEW_CHARS),
            at: Utc::now(),
        });
        while self.history.len() > MAX_HISTORY_TURNS {
            self.history.pop_front();
        }
        self.last_query = Some(truncate_chars(query, QUERY_PREVIEW_CHARS));
        self.last_answer_preview = Some(truncate_chars(answer, ANSWER_PREVIEW_CHARS));
        self.touch();
    }

    pub fn index_note(&mut self, note: NoteRef) {
        self.notes_index.insert(note.topic.clone(), note);
        self.touch();
    }

    /// Merges `update` into the state (see [`SessionUpdate`] for ordering).
    pub fn apply(&mut self, update: SessionUpdate) {
        let SessionUpdate {
            subject,
            reference_list,
            turn,
            notes,
        } = update;

        if let Some(subject) = subject {
            self.set_subject(subject);
        }

        match reference_list {
            Some(ListUpdate::Replace { items, topic }) => self.record_reference_list(items, topic),
            Some(ListUpdate::Clear) => self.clear_reference_list(),
            None => {}
        }

        if let Some(CompletedTurn { query, answer }) = turn {
            self.record_turn(&query, &answer);
        }

        for note in notes {
            self.index_note(note);
        }
    }

    /// Renders a bounded digest of the subject and the most recent turns.
    pub fn summarize(&self) -> String {
        let mut out = String::new();

        if let Some(subject) = &self.current_subject {
            if let Some(product) = &subject.product {
                let _ = writeln!(out, "Current product: {product}");
            }
            if let Some(brand) = &subject.brand {
                let _ = writeln!(out, "Current brand: {brand}");
            }
            if let Some(category) = subject.category {
                let _ = writeln!(out, "Current category: {category}");
            }
        }

        if let Some(query) = &self.last_query {
            let _ = writeln!(out, "Last question: {query}");
        }

        let skip = self.history.len().saturating_sub(SUMMARY_RECENT_TURNS);
        let recent: Vec<&TurnRecord> = self.history.iter().skip(skip).collect();
        if !recent.is_empty() {
            out.push_str("Recent turns:\n");
            for record in recent {
                let _ = writeln!(out, "#{}: {}", record.turn, record.query);
            }
        }

        let out = out.trim_end();
        if out.is_empty() {
            EMPTY_SUMMARY.to_string()
        } else {
            truncate_chars(out, MAX_SUMMARY_CHARS)
        }
    }

    /// Forgets everything except the session id.
    pub fn clear(&mut self) {
        *self = Self::new(std::mem::take(&mut self.session_id));
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.summary = self.summarize();
    }
}
