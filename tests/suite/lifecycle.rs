//! Ready/Busy/Closed transitions and disposal.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use timex_core::{FailurePolicy, Lifecycle, NormalizeError, Normalizer};

use crate::common::{CooperativeEngine, StubbornEngine, new_year_2024, wait_until};

#[test]
fn calls_after_close_are_disposed_under_both_policies() {
    for policy in [FailurePolicy::Strict, FailurePolicy::Lenient] {
        let normalizer = Normalizer::builder()
            .failure_policy(policy)
            .build()
            .unwrap();
        assert_eq!(
            normalizer.normalize_on("tomorrow", 2024, 1, 1).unwrap(),
            "2024-01-02"
        );

        normalizer.close();
        assert!(matches!(
            normalizer.normalize_on("tomorrow", 2024, 1, 1),
            Err(NormalizeError::Disposed)
        ));
        assert_eq!(normalizer.normalize_or_empty("tomorrow"), "");
    }
}

#[test]
fn close_is_idempotent() {
    let normalizer = Normalizer::new().unwrap();
    normalizer.close();
    normalizer.close();
    assert!(normalizer.is_closed());
    assert_eq!(normalizer.lifecycle(), Lifecycle::Closed);
}

#[test]
fn busy_while_engine_runs_and_close_cancels_it() {
    let normalizer = Arc::new(
        Normalizer::builder()
            .timeout_ms(10_000)
            .engine(CooperativeEngine)
            .build()
            .unwrap(),
    );
    assert_eq!(normalizer.lifecycle(), Lifecycle::Ready);

    let caller = {
        let normalizer = Arc::clone(&normalizer);
        thread::spawn(move || normalizer.normalize_anchored("forever", new_year_2024()))
    };
    assert!(wait_until(|| normalizer.lifecycle() == Lifecycle::Busy));

    normalizer.close();
    let result = caller.join().unwrap();
    assert!(matches!(result, Err(NormalizeError::Disposed)));
    assert_eq!(normalizer.lifecycle(), Lifecycle::Closed);
}

#[test]
fn close_releases_in_flight_and_queued_calls_at_once() {
    let engine = StubbornEngine::shared(Duration::from_secs(3));
    let normalizer = Arc::new(
        Normalizer::builder()
            .timeout_ms(10_000)
            .shared_engine(engine.clone())
            .build()
            .unwrap(),
    );
    let submit = |text: &'static str| {
        let normalizer = Arc::clone(&normalizer);
        thread::spawn(move || normalizer.normalize_anchored(text, new_year_2024()))
    };

    let in_flight = submit("stall first");
    assert!(wait_until(|| normalizer.lifecycle() == Lifecycle::Busy));
    let queued = submit("stall second");
    assert!(wait_until(|| normalizer.queued_tasks() == 1));

    let closed_at = Instant::now();
    normalizer.close();
    assert!(matches!(
        in_flight.join().unwrap(),
        Err(NormalizeError::Disposed)
    ));
    assert!(matches!(queued.join().unwrap(), Err(NormalizeError::Disposed)));
    assert!(closed_at.elapsed() < Duration::from_secs(1));
    assert_eq!(engine.calls(), 1);
    assert_eq!(normalizer.diagnostics().disposed, 2);
}

#[test]
fn drop_releases_worker_without_blocking() {
    let normalizer = Normalizer::builder()
        .timeout_ms(100)
        .engine(CooperativeEngine)
        .build()
        .unwrap();
    assert!(
        normalizer
            .normalize_anchored("forever", new_year_2024())
            .is_err()
    );
    drop(normalizer);
}
