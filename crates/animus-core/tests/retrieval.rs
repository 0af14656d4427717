use animus_core::{recency, retrieval_score, EventKind, KeywordOverlap, MemoryEvent, Relevance, ScoreWeights};

#[test]
fn recency_is_monotonically_decreasing_in_age() {
    let mut last = f32::INFINITY;
    for age_min in 0..=12u64 {
        let r = recency(age_min * 60_000);
        assert!(r <= last, "recency rose at {} minutes", age_min);
        last = r;
    }
}

#[test]
fn recency_hits_zero_at_ten_minutes() {
    assert_eq!(recency(10 * 60_000), 0.0);
    assert_eq!(recency(11 * 60_000), 0.0);
    assert!(recency(9 * 60_000) > 0.0);
    assert_eq!(recency(0), 1.0);
}

#[test]
fn recency_decay_is_linear() {
    let half = recency(5 * 60_000);
    assert!((half - 0.5).abs() < 1e-6);
}

#[test]
fn score_uses_default_weights() {
    let weights = ScoreWeights::default();
    let event = MemoryEvent::new(EventKind::Observation, 0, "saw kel near reactor")
        .with_importance(1.0);
    // Fresh event, full importance, full relevance.
    let score = retrieval_score(&weights, &event, 0, 1.0);
    assert!((score - 1.0).abs() < 1e-6);

    // Stale event: only importance and relevance contribute.
    let stale = retrieval_score(&weights, &event, 20 * 60_000, 1.0);
    assert!((stale - 0.7).abs() < 1e-6);
}

#[test]
fn score_decreases_with_age_for_fixed_importance_and_relevance() {
    let weights = ScoreWeights::default();
    let event = MemoryEvent::new(EventKind::Observation, 0, "anything");
    let mut last = f32::INFINITY;
    for age_min in 0..=10u64 {
        let s = retrieval_score(&weights, &event, age_min * 60_000, 0.5);
        assert!(s <= last);
        last = s;
    }
}

#[test]
fn keyword_overlap_is_bounded_and_monotonic() {
    let rel = KeywordOverlap;
    let text = "I saw Kel leave the reactor just before the lights went out";

    let none = rel.score("cafeteria vent", text);
    let some = rel.score("reactor vent", text);
    let all = rel.score("reactor lights", text);

    assert_eq!(none, 0.0);
    assert!(some > none && some < all);
    assert_eq!(all, 1.0);
    assert_eq!(rel.score("", text), 0.0);
}
