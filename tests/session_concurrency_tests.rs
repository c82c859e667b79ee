//! Per-session serialization and call deadlines.

mod common;

use std::time::{Duration, Instant};

use rouge::composer::{ComposeError, MockGenerator};
use rouge::engine::EngineError;
use rouge::intent::MockClassifier;
use rouge::retrieval::{MockReranker, MockVectorSearch};
use rouge::router::Flow;
use rouge::service::ServiceError;
use rouge::session::{SessionUpdate, Subject};

use common::fixtures::{HarnessBuilder, IntentBuilder, LIPSTICK_LIST_ANSWER, SESSION_ID, review};

#[tokio::test]
async fn test_same_session_turns_are_serialized() {
    let h = HarnessBuilder::new()
        .generator(MockGenerator::default().with_delay(Duration::from_millis(100)))
        .build();

    let start = Instant::now();
    let (first, second) = tokio::join!(
        h.engine.handle_turn(SESSION_ID, "What's a good night routine?"),
        h.engine.handle_turn(SESSION_ID, "And what about mornings?"),
    );
    let elapsed = start.elapsed();

    let mut turns = vec![
        first.expect("first turn").turn,
        second.expect("second turn").turn,
    ];
    turns.sort_unstable();
    assert_eq!(turns, vec![1, 2]);
    assert!(
        elapsed >= Duration::from_millis(200),
        "turns overlapped: {}ms",
        elapsed.as_millis()
    );

    let state = h.engine.session_snapshot(SESSION_ID).await;
    assert_eq!(state.turn_count(), 2);
    assert_eq!(state.history().count(), 2);
}

#[tokio::test]
async fn test_different_sessions_run_in_parallel() {
    let h = HarnessBuilder::new()
        .generator(MockGenerator::default().with_delay(Duration::from_millis(100)))
        .build();

    let start = Instant::now();
    let (a, b) = tokio::join!(
        h.engine.handle_turn("session-a", "What's a good night routine?"),
        h.engine.handle_turn("session-b", "What's a good night routine?"),
    );
    let elapsed = start.elapsed();

    assert_eq!(a.expect("session a").turn, 1);
    assert_eq!(b.expect("session b").turn, 1);
    assert!(
        elapsed < Duration::from_millis(190),
        "independent sessions took {}ms",
        elapsed.as_millis()
    );
    assert!(h.engine.sessions().contains("session-a"));
    assert!(h.engine.sessions().contains("session-b"));
}

#[tokio::test]
async fn test_slow_classifier_times_out_and_degrades() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().with_delay(Duration::from_millis(300)))
        .call_timeout(Duration::from_millis(50))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Which concealer hides dark circles?")
        .await
        .expect("classifier timeout is not a turn failure");

    assert!(outcome.has("classification_invalid"));
    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
}

#[tokio::test]
async fn test_slow_search_times_out_and_degrades() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond("ruby woo", &IntentBuilder::product_question().build()))
        .search(
            MockVectorSearch::new()
                .respond("ruby woo", review("MAC Ruby Woo"))
                .with_delay(Duration::from_millis(300)),
        )
        .call_timeout(Duration::from_millis(50))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Does Ruby Woo transfer?")
        .await
        .expect("search timeout is not a turn failure");

    assert!(outcome.has("retrieval_unavailable"));
    assert!(outcome.evidence.is_none());
    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
    assert_eq!(h.reranker.call_count(), 0);
}

#[tokio::test]
async fn test_slow_rerank_times_out_and_degrades() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond("ruby woo", &IntentBuilder::product_question().build()))
        .search(MockVectorSearch::new().respond("ruby woo", review("MAC Ruby Woo")))
        .reranker(MockReranker::new().with_delay(Duration::from_millis(300)))
        .call_timeout(Duration::from_millis(50))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Does Ruby Woo transfer?")
        .await
        .expect("rerank timeout is not a turn failure");

    assert!(outcome.has("retrieval_unavailable"));
    assert!(outcome.evidence.is_none());
}

#[tokio::test]
async fn test_slow_generator_fails_turn_without_state_change() {
    let h = HarnessBuilder::new()
        .generator(MockGenerator::default().with_delay(Duration::from_millis(300)))
        .call_timeout(Duration::from_millis(50))
        .build();

    let result = h
        .engine
        .handle_turn(SESSION_ID, "What's a good night routine?")
        .await;

    let err = match result {
        Err(EngineError::GenerationFailure(ComposeError::Service(err))) => err,
        other => panic!("expected generation timeout, got {other:?}"),
    };
    assert!(err.is_timeout());
    assert!(matches!(err, ServiceError::Timeout { .. }));

    let state = h.engine.session_snapshot(SESSION_ID).await;
    assert_eq!(state.turn_count(), 0);
    assert!(state.last_query().is_none());
}

#[tokio::test]
async fn test_dropped_turn_leaves_session_untouched() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond(
            "sugar matte",
            &IntentBuilder::product_question().product("Sugar Matte").build(),
        ))
        .search(MockVectorSearch::new().respond("sugar matte", review("Sugar Matte")))
        .generator(
            MockGenerator::new(LIPSTICK_LIST_ANSWER).with_delay(Duration::from_millis(300)),
        )
        .build();

    h.engine
        .sessions()
        .update(
            SESSION_ID,
            SessionUpdate {
                subject: Some(Subject::product("MAC Ruby Woo")),
                ..Default::default()
            },
        )
        .await;
    h.seed_lipstick_list().await;
    let before = h.engine.session_snapshot(SESSION_ID).await;

    let dropped = tokio::time::timeout(
        Duration::from_millis(50),
        h.engine.handle_turn(SESSION_ID, "Is Sugar Matte drying?"),
    )
    .await;
    assert!(dropped.is_err(), "turn should still be waiting on generation");
    assert_eq!(h.generator.call_count(), 1);

    let after = tokio::time::timeout(
        Duration::from_millis(100),
        h.engine.session_snapshot(SESSION_ID),
    )
    .await
    .expect("session lock released when the turn was dropped");

    assert_eq!(after.turn_count(), before.turn_count());
    assert_eq!(after.current_subject(), before.current_subject());
    assert_eq!(after.subject_generation(), before.subject_generation());
    assert_eq!(after.reference_list(), before.reference_list());
    assert!(!after.reference_list_is_stale());
    assert!(after.notes_index().is_empty());
    assert!(h.notes.is_empty());

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Is Sugar Matte drying?")
        .await
        .expect("session still serves turns");
    assert_eq!(outcome.turn, 1);
}
