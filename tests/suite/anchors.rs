//! Input validation that happens before the engine is involved.

use timex_core::{AnchorPoint, FailurePolicy, NormalizeError, Normalizer, OutcomeKind};

use crate::common::RecordingEngine;

#[test]
fn impossible_calendar_dates_never_reach_engine() {
    let engine = RecordingEngine::shared();
    let normalizer = Normalizer::builder()
        .shared_engine(engine.clone())
        .build()
        .unwrap();

    let err = normalizer.normalize_on("tomorrow", 2024, 13, 1).unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidInput { .. }));
    assert!(err.to_string().contains("Invalid anchor date"));

    let err = normalizer.normalize_on("tomorrow", 2023, 2, 30).unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidInput { .. }));

    let err = normalizer
        .normalize_at("tomorrow", 2024, 1, 1, 24, 0)
        .unwrap_err();
    assert!(matches!(err, NormalizeError::InvalidInput { .. }));

    assert_eq!(engine.calls(), 0);
    assert_eq!(normalizer.diagnostics().invalid_input, 3);
}

#[test]
fn leap_day_is_a_valid_anchor() {
    let normalizer = Normalizer::new().unwrap();
    assert_eq!(
        normalizer.normalize_on("tomorrow", 2024, 2, 29).unwrap(),
        "2024-03-01"
    );
}

#[test]
fn blank_text_is_invalid_input() {
    let engine = RecordingEngine::shared();
    let normalizer = Normalizer::builder()
        .shared_engine(engine.clone())
        .build()
        .unwrap();

    for blank in ["", "   ", "\t\n"] {
        let outcome = normalizer
            .evaluate(blank, AnchorPoint::date(2024, 1, 1).unwrap())
            .unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::InvalidInput);
    }
    assert_eq!(engine.calls(), 0);
}

#[test]
fn lenient_policy_swallows_invalid_anchor() {
    let normalizer = Normalizer::builder()
        .failure_policy(FailurePolicy::Lenient)
        .build()
        .unwrap();
    assert_eq!(normalizer.normalize_on("tomorrow", 2024, 2, 30).unwrap(), "");
    assert!(normalizer.diagnostics().last_failure.is_some());
}

#[test]
fn whitespace_is_collapsed_before_engine() {
    let engine = RecordingEngine::shared();
    let normalizer = Normalizer::builder()
        .shared_engine(engine.clone())
        .build()
        .unwrap();

    normalizer
        .normalize_on("  some   time\ttoday ", 2024, 1, 1)
        .unwrap();
    assert_eq!(engine.seen(), vec!["some time today".to_string()]);
}

#[test]
fn time_of_day_anchor_is_passed_through() {
    let engine = RecordingEngine::shared();
    let normalizer = Normalizer::builder()
        .shared_engine(engine.clone())
        .build()
        .unwrap();

    let value = normalizer
        .normalize_at("in a bit", 2024, 1, 1, 9, 30)
        .unwrap();
    assert_eq!(value, "2024-01-01T09:30:00");
}

#[test]
fn timeout_bounds_are_enforced_at_construction() {
    for millis in [99, 10_001] {
        assert!(matches!(
            Normalizer::builder().timeout_ms(millis).build(),
            Err(NormalizeError::InvalidInput { .. })
        ));
    }
    for millis in [100, 10_000] {
        assert_eq!(
            Normalizer::builder()
                .timeout_ms(millis)
                .build()
                .unwrap()
                .timeout_ms(),
            millis
        );
    }
}
