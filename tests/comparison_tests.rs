//! Comparison queries through the full turn pipeline.

mod common;

use std::time::{Duration, Instant};

use rouge::comparison::ComparisonPattern;
use rouge::engine::Degradation;
use rouge::intent::MockClassifier;
use rouge::retrieval::{Evidence, MockVectorSearch};
use rouge::router::Flow;

use common::fixtures::{HarnessBuilder, IntentBuilder, SESSION_ID, review};

const LEFT: &str = "MAC Ruby Woo";
const RIGHT: &str = "Maybelline Superstay Red";
const QUERY: &str = "MAC Ruby Woo vs Maybelline Superstay Red";

fn comparison_classifier() -> MockClassifier {
    MockClassifier::new()
        .respond(" vs ", &IntentBuilder::product_question().build())
        .respond("maybelline", &IntentBuilder::product_question().build())
}

fn both_products() -> MockVectorSearch {
    MockVectorSearch::new()
        .respond("ruby woo", review(LEFT))
        .respond("superstay", review(RIGHT))
}

#[tokio::test]
async fn test_comparison_retrieves_each_comparand() {
    let h = HarnessBuilder::new()
        .classifier(comparison_classifier())
        .search(both_products())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, QUERY)
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::Retrieve);
    assert!(!outcome.is_degraded());

    let Evidence::Comparison(sets) = &outcome.evidence else {
        panic!("expected comparison evidence, got {:?}", outcome.evidence);
    };
    assert_eq!(sets.len(), 2);
    assert_eq!(
        outcome.evidence.for_comparand(LEFT).and_then(|s| s.top_label()),
        Some(LEFT)
    );
    assert_eq!(
        outcome.evidence.for_comparand(RIGHT).and_then(|s| s.top_label()),
        Some(RIGHT)
    );

    let calls = h.search.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.top_k == 20 && c.category.is_none()));
    let mut queries: Vec<&str> = calls.iter().map(|c| c.query.as_str()).collect();
    queries.sort_unstable();
    assert_eq!(queries, vec![LEFT, RIGHT]);

    let request = h.generator.last_request().expect("generator was called");
    assert!(
        request
            .routing_facts
            .contains("COMPARING: MAC Ruby Woo | Maybelline Superstay Red")
    );
    assert!(request.evidence.contains("=== MAC Ruby Woo ==="));
    assert!(request.evidence.contains("=== Maybelline Superstay Red ==="));
}

#[tokio::test]
async fn test_comparison_with_one_weak_comparand_keeps_the_other() {
    let h = HarnessBuilder::new()
        .classifier(comparison_classifier())
        .search(MockVectorSearch::new().respond("ruby woo", review(LEFT)))
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, QUERY)
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::Retrieve);
    assert!(outcome.evidence.for_comparand(LEFT).is_some());
    assert!(outcome.evidence.for_comparand(RIGHT).is_none());
    assert!(outcome.degradations.contains(&Degradation::LowConfidence {
        comparand: Some(RIGHT.to_string()),
        top_score: None,
    }));

    let request = h.generator.last_request().expect("generator was called");
    assert!(request.routing_facts.contains("COMPARING:"));
}

#[tokio::test]
async fn test_comparison_with_no_usable_comparand_falls_back() {
    let h = HarnessBuilder::new()
        .classifier(comparison_classifier())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, QUERY)
        .await
        .expect("turn should succeed");

    assert_eq!(outcome.decision.flow, Flow::SkipGeneral);
    assert!(outcome.evidence.is_none());
    let low = outcome
        .degradations
        .iter()
        .filter(|d| matches!(d, Degradation::LowConfidence { .. }))
        .count();
    assert_eq!(low, 2);
}

#[tokio::test]
async fn test_empty_comparand_falls_through_to_single_subject() {
    let h = HarnessBuilder::new()
        .classifier(comparison_classifier())
        .search(both_products())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "vs Maybelline Superstay Red")
        .await
        .expect("turn should succeed");

    assert!(outcome.degradations.contains(&Degradation::EmptyComparand {
        pattern: ComparisonPattern::Versus,
    }));
    assert!(matches!(outcome.evidence, Evidence::Single(_)));

    let calls = h.search.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "vs Maybelline Superstay Red");
    assert_eq!(calls[0].top_k, 30);
}

#[tokio::test]
async fn test_comparands_are_retrieved_concurrently() {
    let h = HarnessBuilder::new()
        .classifier(comparison_classifier())
        .search(both_products().with_delay(Duration::from_millis(150)))
        .build();

    let start = Instant::now();
    let outcome = h
        .engine
        .handle_turn(SESSION_ID, QUERY)
        .await
        .expect("turn should succeed");
    let elapsed = start.elapsed();

    assert_eq!(outcome.evidence.item_count(), 6);
    assert!(
        elapsed < Duration::from_millis(280),
        "comparison took {}ms, expected both searches to overlap",
        elapsed.as_millis()
    );
}

#[tokio::test]
async fn test_or_inside_a_question_retrieves_single_subject() {
    let h = HarnessBuilder::new()
        .classifier(comparison_classifier().respond("ruby woo", &IntentBuilder::product_question().build()))
        .search(both_products())
        .build();

    let outcome = h
        .engine
        .handle_turn(SESSION_ID, "Does MAC Ruby Woo transfer or smudge?")
        .await
        .expect("turn should succeed");

    assert!(matches!(outcome.evidence, Evidence::Single(_)));
    assert_eq!(outcome.decision.flow, Flow::Retrieve);

    let calls = h.search.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "Does MAC Ruby Woo transfer or smudge?");
    assert_eq!(calls[0].top_k, 30);
}
