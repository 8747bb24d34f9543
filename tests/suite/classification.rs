//! How engine results map onto the outcome taxonomy under each policy.

use std::error::Error;

use timex_core::{FailurePolicy, NormalizeError, Normalizer, OutcomeKind};

use crate::common::{FailingEngine, PanickingEngine, new_year_2024};

#[test]
fn unparseable_expression_is_unsupported_under_strict() {
    let normalizer = Normalizer::new().unwrap();
    let err = normalizer.normalize_on("5 o'clock", 2024, 1, 1).unwrap_err();

    assert!(matches!(err, NormalizeError::Unsupported { .. }));
    assert_eq!(
        err.to_string(),
        "Unable to normalize temporal expression 5 o'clock"
    );
    let cause = err.source().expect("engine failure is attached");
    assert!(cause.to_string().starts_with("unsupported expression"));
}

#[test]
fn unparseable_expression_is_empty_under_lenient() {
    let normalizer = Normalizer::builder()
        .failure_policy(FailurePolicy::Lenient)
        .build()
        .unwrap();

    assert_eq!(normalizer.normalize_on("5 o'clock", 2024, 1, 1).unwrap(), "");
    let diagnostics = normalizer.diagnostics();
    assert_eq!(diagnostics.unsupported, 1);
    assert!(
        diagnostics
            .last_failure
            .unwrap()
            .contains("Unable to normalize temporal expression 5 o'clock")
    );
}

#[test]
fn unknown_failure_description_defaults_to_unsupported() {
    let normalizer = Normalizer::builder()
        .engine(FailingEngine("grammar returned nothing useful"))
        .build()
        .unwrap();
    let outcome = normalizer.evaluate("whenever", new_year_2024()).unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Unsupported);
}

#[test]
fn interrupted_failure_description_is_timeout() {
    let normalizer = Normalizer::builder()
        .timeout_ms(300)
        .engine(FailingEngine("InterruptedException: sleep interrupted"))
        .build()
        .unwrap();
    let err = normalizer
        .normalize_anchored("whenever", new_year_2024())
        .unwrap_err();
    match err {
        NormalizeError::TimedOut { text, timeout_ms } => {
            assert_eq!(text, "whenever");
            assert_eq!(timeout_ms, 300);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn engine_panic_is_contained_to_one_call() {
    let normalizer = Normalizer::builder()
        .engine(PanickingEngine)
        .build()
        .unwrap();

    let err = normalizer
        .normalize_anchored("anything", new_year_2024())
        .unwrap_err();
    assert!(matches!(err, NormalizeError::Unsupported { .. }));
    let cause = err.source().unwrap().to_string();
    assert_eq!(cause, "engine panicked: rule table exhausted");

    // The worker survives for the next call.
    assert!(!normalizer.is_closed());
    assert!(
        normalizer
            .normalize_anchored("again", new_year_2024())
            .is_err()
    );
    assert_eq!(normalizer.diagnostics().engine_calls, 2);
}

#[test]
fn normalize_or_empty_swallows_strict_failures() {
    let normalizer = Normalizer::new().unwrap();
    assert_eq!(normalizer.normalize_or_empty("before noon"), "");
}
