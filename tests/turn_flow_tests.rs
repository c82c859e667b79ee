//! End-to-end turn tests: routing flows, the confidence gate and failure handling.

mod common;

use rouge::composer::{AnswerSource, ComposeError, MockGenerator};
use rouge::engine::{Degradation, EngineError};
use rouge::intent::{Domain, IntentRecord, MockClassifier};
use rouge::retrieval::{Evidence, MockReranker, MockVectorSearch};
use rouge::router::Flow;
use rouge::session::EMPTY_SUMMARY;

use common::fixtures::{
    HarnessBuilder, IntentBuilder, LIPSTICK_LIST, SESSION_ID, review, section,
};

#[tokio::test]
async fn test_off_topic_query_skips_retrieval() {
    let h = HarnessBuilder::new()
        .classifier(
            MockClassifier::new().respond("weather", &IntentBuilder::new(Domain::OffTopic).build()),
        )
        .generator(MockGenerator::new("I stick to beauty, but I'd love to help with your routine!"))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "What's the weather like in Mumbai today?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::SkipOffTopic);
    assert!(outcome.evidence.is_none());
    assert!(!outcome.is_degraded());
    assert_eq!(outcome.source, AnswerSource::Generated);
    assert_eq!(h.search.call_count(), 0);
    assert_eq!(h.reranker.call_count(), 0);
    assert_eq!(h.generator.call_count(), 1);
}

#[tokio::test]
async fn test_canned_off_topic_reply_skips_generator() {
    let h = HarnessBuilder::new()
        .classifier(
            MockClassifier::new().respond("weather", &IntentBuilder::new(Domain::OffTopic).build()),
        )
        .canned_off_topic()
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "What's the weather like in Mumbai today?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.source, AnswerSource::Canned);
    assert!(!outcome.answer.is_empty());
    assert_eq!(h.generator.call_count(), 0);
    assert_eq!(outcome.turn, 1);
}

#[tokio::test]
async fn test_brand_only_query_skips_retrieval() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond(
            "brand",
            &IntentBuilder::new(Domain::BrandOnly).brand("Lakme").build(),
        ))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "What do you think of the brand Lakme?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::SkipBrandOnly);
    assert!(outcome.decision.retrieval_query.is_none());
    assert_eq!(h.search.call_count(), 0);
}

#[tokio::test]
async fn test_product_question_attaches_evidence() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond(
            "ruby woo",
            &IntentBuilder::product_question()
                .brand("MAC")
                .product("Ruby Woo")
                .build(),
        ))
        .search(MockVectorSearch::new().respond("ruby woo", review("MAC Ruby Woo")))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Is MAC Ruby Woo drying?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::Retrieve);
    assert_eq!(outcome.resolved_entity.as_deref(), Some("MAC Ruby Woo"));
    assert_eq!(outcome.evidence.item_count(), 3);
    assert!(!outcome.is_degraded());

    let Evidence::Single(set) = &outcome.evidence else {
        panic!("expected single-subject evidence, got {:?}", outcome.evidence);
    };
    assert!(set.is_usable());
    assert_eq!(set.items[0].section, "Real Concerns");

    let request = h.generator.last_request().expect("generator was called");
    assert!(request.evidence.contains("[Real Concerns] MAC Ruby Woo:"));
    assert!(request.routing_facts.contains("FLOW: retrieve"));
}

#[tokio::test]
async fn test_low_confidence_falls_back_to_general() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond("glossy", &IntentBuilder::product_question().build()))
        .search(MockVectorSearch::new().respond(
            "glossy thing",
            vec![section("Dewdrop Lip Oil", "Overview", "A sheer tinted oil.", 0.9)],
        ))
        .reranker(MockReranker::new().score("Dewdrop Lip Oil", 0.12))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Is the Glossy Thing any good?")
        .await
        .expect("low confidence is not a turn failure");

    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
    assert!(outcome.decision.retrieval_query.is_none());
    assert!(outcome.evidence.is_none());
    assert!(outcome.degradations.contains(&Degradation::LowConfidence {
        comparand: None,
        top_score: Some(0.12),
    }));

    let request = h.generator.last_request().expect("generator was called");
    assert!(request.routing_facts.contains("FLOW: skip_retrieval_general"));
    assert!(request.routing_facts.contains("DEGRADED: low_confidence"));
    assert!(request.evidence.contains("no product data"));
}

#[tokio::test]
async fn test_exact_label_match_passes_gate_despite_low_score() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond("sugar", &IntentBuilder::product_question().build()))
        .search(MockVectorSearch::new().respond("sugar matte", review("Sugar Matte")))
        .reranker(MockReranker::new().score("Sugar Matte", 0.05))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "How long does Sugar Matte last?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::Retrieve);
    assert!(!outcome.has("low_confidence"));
    assert_eq!(outcome.evidence.item_count(), 3);
}

#[tokio::test]
async fn test_product_question_without_retrieval_is_demoted() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond(
            "lipstick",
            &IntentBuilder::new(Domain::ProductSpecific).build(),
        ))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Is lipstick bad for you?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
    assert!(outcome.decision.demoted);
    assert_eq!(h.search.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_classification_degrades_to_general() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond_raw("broken", "this is not json"))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "broken payload please")
        .await
        .expect("invalid classification is not a turn failure");

    assert!(outcome.has("classification_invalid"));
    assert_eq!(outcome.intent, IntentRecord::degraded());
    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
    assert!(outcome.decision.carried_clarification.needed);
    assert_eq!(h.search.call_count(), 0);
}

#[tokio::test]
async fn test_classifier_transport_failure_degrades() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::failing())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Which blush suits olive skin?")
        .await
        .expect("turn should succeed");

    assert!(outcome.has("classification_invalid"));
    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
}

#[tokio::test]
async fn test_retrieval_failure_degrades_to_general() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond("ruby woo", &IntentBuilder::product_question().build()))
        .search(MockVectorSearch::failing())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Does Ruby Woo transfer?")
        .await
        .expect("retrieval failure is not a turn failure");

    assert!(outcome.has("retrieval_unavailable"));
    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
    assert!(outcome.evidence.is_none());
    assert_eq!(h.reranker.call_count(), 0);
}

#[tokio::test]
async fn test_rerank_failure_degrades_to_general() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond("ruby woo", &IntentBuilder::product_question().build()))
        .search(MockVectorSearch::new().respond("ruby woo", review("MAC Ruby Woo")))
        .reranker(MockReranker::failing())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Does Ruby Woo transfer?")
        .await
        .expect("turn should succeed");

    assert!(outcome.has("retrieval_unavailable"));
    assert!(outcome.evidence.is_none());
}

#[tokio::test]
async fn test_invalid_query_is_rejected_before_any_call() {
    let h = HarnessBuilder::new().build();

    for query in ["", "   ", "a"] {
        let result = h.engine.handle_turn(SESSION_ID, query).await;
        assert!(
            matches!(result, Err(EngineError::InvalidQuery { .. })),
            "query {query:?} should be rejected"
        );
    }

    let too_long = "x".repeat(5001);
    assert!(matches!(
        h.engine.handle_turn(SESSION_ID, &too_long).await,
        Err(EngineError::InvalidQuery { .. })
    ));

    assert_eq!(h.classifier.call_count(), 0);
    assert_eq!(h.engine.session_snapshot(SESSION_ID).await.turn_count(), 0);
}

#[tokio::test]
async fn test_generation_failure_leaves_session_untouched() {
    let h = HarnessBuilder::new()
        .classifier(MockClassifier::new().respond(
            "2nd one",
            &IntentBuilder::product_question().ordinal().build(),
        ))
        .search(MockVectorSearch::new().respond("lakme", review("Lakme Forever Matte")))
        .generator(MockGenerator::failing())
        .build();
    h.seed_lipstick_list().await;

    let result = h
        .engine
        .handle_turn(SESSION_ID, "Tell me about the 2nd one")
        .await;

    assert!(matches!(
        result,
        Err(EngineError::GenerationFailure(ComposeError::Service(_)))
    ));

    let state = h.engine.session_snapshot(SESSION_ID).await;
    assert_eq!(state.turn_count(), 0);
    assert!(state.current_subject().is_none());
    let list = state.reference_list().expect("list kept");
    assert_eq!(list.items(), LIPSTICK_LIST.map(String::from).as_slice());
    assert!(!state.reference_list_is_stale());
}

#[tokio::test]
async fn test_meta_only_answer_is_generation_failure() {
    let h = HarnessBuilder::new()
        .generator(MockGenerator::new("Let me save that to my notes."))
        .build();

    let result = h
        .engine
        .handle_turn(SESSION_ID, "What's a good night routine?")
        .await;

    assert!(matches!(
        result,
        Err(EngineError::GenerationFailure(ComposeError::EmptyAnswer))
    ));
    assert_eq!(h.engine.session_snapshot(SESSION_ID).await.turn_count(), 0);
}

#[tokio::test]
async fn test_answer_preamble_is_stripped() {
    let h = HarnessBuilder::new()
        .generator(MockGenerator::new(
            "I've updated my notes with your preferences.\n\nDouble cleansing works best at night.",
        ))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "What's a good night routine?")
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.answer, "Double cleansing works best at night.");
}

#[tokio::test]
async fn test_reset_forgets_session() {
    let h = HarnessBuilder::new().build();

    h.engine
        .handle_turn(SESSION_ID, "What's a good night routine?")
        .await
        .expect("turn should succeed");
    assert_eq!(h.engine.session_snapshot(SESSION_ID).await.turn_count(), 1);

    h.engine.reset_session(SESSION_ID).await;

    let state = h.engine.session_snapshot(SESSION_ID).await;
    assert_eq!(state.turn_count(), 0);
    assert_eq!(state.summarize(), EMPTY_SUMMARY);
}

#[tokio::test]
async fn test_summary_reaches_classifier_on_next_turn() {
    let h = HarnessBuilder::new().build();

    h.engine
        .handle_turn(SESSION_ID, "What's a good night routine?")
        .await
        .expect("first turn");
    h.engine
        .handle_turn(SESSION_ID, "And in the morning?")
        .await
        .expect("second turn");

    let requests = h.classifier.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].session_summary, EMPTY_SUMMARY);
    assert!(requests[1].session_summary.contains("What's a good night routine?"));
    let prior = requests[1].prior_turn.as_ref().expect("prior turn shown");
    assert_eq!(prior.answer_preview, "Here's the scoop.");
}
