use super::*;
use crate::intent::Category;
use crate::notes::NoteRef;
use crate::resolver::UnresolvedReason;
use crate::session::{SessionState, Subject};

#[test]
fn test_validate_query_trims() {
    assert_eq!(
        validate_query("  does it transfer?  ").expect("valid"),
        "does it transfer?"
    );
}

#[test]
fn test_validate_query_bounds() {
    assert!(matches!(
        validate_query(" a "),
        Err(EngineError::InvalidQuery { .. })
    ));
    assert!(matches!(
        validate_query(&"x".repeat(MAX_QUERY_CHARS + 1)),
        Err(EngineError::InvalidQuery { .. })
    ));
    assert!(validate_query("hi").is_ok());
    assert!(validate_query(&"x".repeat(MAX_QUERY_CHARS)).is_ok());
}

#[test]
fn test_off_topic_skips_resolution() {
    let intent = IntentRecord {
        has_ordinal: true,
        ..IntentRecord::new(Domain::OffTopic)
    };
    let (resolution, err) =
        resolve_references("what about the 2nd one", &intent, &SessionState::new("s"));
    assert!(err.is_none());
    assert!(resolution.subject.is_none());
    assert_eq!(resolution.resolved_query, "what about the 2nd one");
}

#[test]
fn test_unresolved_reference_keeps_no_subject() {
    let intent = IntentRecord {
        has_ordinal: true,
        detected_category: Some(Category::Lipstick),
        ..IntentRecord::new(Domain::ProductSpecific)
    };
    let (resolution, err) =
        resolve_references("the 2nd one please", &intent, &SessionState::new("s"));
    assert!(matches!(
        err,
        Some(ResolveError::UnresolvedReference {
            reason: UnresolvedReason::NoList,
            ..
        })
    ));
    assert!(resolution.subject.is_none());
    assert_eq!(resolution.category, Some(Category::Lipstick));
}

#[test]
fn test_list_topic_prefers_resolved_subject() {
    let mut state = SessionState::new("s");
    state.set_subject(Subject::product("Old Pick"));
    let resolution = Resolution {
        subject: Some(Subject::default().with_category(Some(Category::LipGloss))),
        ..Resolution::passthrough("best gloss", None)
    };
    assert_eq!(list_topic(&state, &resolution), "lip_gloss");
}

#[test]
fn test_list_topic_without_subject_is_fixed() {
    let mut state = SessionState::new("s");
    let resolution = Resolution::passthrough("best picks", None);
    assert_eq!(list_topic(&state, &resolution), UNSCOPED_LIST_TOPIC);

    state.record_turn("best picks", "1. A\n2. B");
    state.record_turn("more picks", "1. C\n2. D");
    assert_eq!(list_topic(&state, &resolution), UNSCOPED_LIST_TOPIC);
}

#[test]
fn test_active_note_topic_requires_indexed_note() {
    let mut state = SessionState::new("s");
    state.record_reference_list(vec!["A".to_string()], Some("reds".to_string()));
    assert_eq!(active_note_topic(&state), None);

    state.index_note(NoteRef::new("reds", 10));
    assert_eq!(active_note_topic(&state).as_deref(), Some("reds"));
}

#[test]
fn test_active_note_topic_from_subject() {
    let mut state = SessionState::new("s");
    state.set_subject(Subject::product("Ruby Woo").with_brand(Some("MAC".to_string())));
    state.index_note(NoteRef::new("mac_ruby_woo", 10));
    assert_eq!(active_note_topic(&state).as_deref(), Some("mac_ruby_woo"));
}

#[test]
fn test_degradation_codes_and_display() {
    let low = Degradation::LowConfidence {
        comparand: Some("Sugar Matte".to_string()),
        top_score: Some(0.12),
    };
    assert_eq!(low.code(), "low_confidence");
    assert_eq!(
        low.to_string(),
        "low confidence for 'Sugar Matte' (top_score: 0.1200)"
    );

    let unresolved = Degradation::UnresolvedReference {
        phrase: "the 5th one".to_string(),
        reason: UnresolvedReason::OutOfRange { index: 5, len: 3 },
    };
    assert!(unresolved.asks_for_reference());
    assert!(unresolved.to_string().contains("outside a list of 3"));
    assert!(!low.asks_for_reference());
}

#[test]
fn test_settings_share_call_timeout() {
    let settings =
        EngineSettings::default().with_call_timeout(std::time::Duration::from_millis(50));
    assert_eq!(settings.retrieval.call_timeout, settings.call_timeout);
}
