//! Per-normalizer counters and last-failure detail.
//!
//! Under the lenient policy this is the only place a swallowed failure can be
//! observed besides the `tracing` stream.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicU64, Ordering};

use timex_types::OutcomeKind;

#[derive(Debug, Default)]
pub struct Diagnostics {
    engine_calls: AtomicU64,
    succeeded: AtomicU64,
    unsupported: AtomicU64,
    timed_out: AtomicU64,
    invalid_input: AtomicU64,
    disposed: AtomicU64,
    stale_discarded: AtomicU64,
    last_failure: Mutex<Option<String>>,
}

/// Point-in-time copy of [`Diagnostics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    /// Tasks the worker actually handed to the engine.
    pub engine_calls: u64,
    pub succeeded: u64,
    pub unsupported: u64,
    pub timed_out: u64,
    pub invalid_input: u64,
    /// Calls rejected because the normalizer was closed.
    pub disposed: u64,
    /// Results or queued tasks dropped because their caller had given up.
    pub stale_discarded: u64,
    pub last_failure: Option<String>,
}

impl Diagnostics {
    pub(crate) fn record_engine_call(&self) {
        self.engine_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_stale(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disposed(&self) {
        self.disposed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_outcome(&self, kind: OutcomeKind) {
        let counter = match kind {
            OutcomeKind::Success => &self.succeeded,
            OutcomeKind::Unsupported => &self.unsupported,
            OutcomeKind::TimedOut => &self.timed_out,
            OutcomeKind::InvalidInput => &self.invalid_input,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, message: String) {
        *self
            .last_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    #[must_use]
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            engine_calls: self.engine_calls.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            unsupported: self.unsupported.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            invalid_input: self.invalid_input.load(Ordering::Relaxed),
            disposed: self.disposed.load(Ordering::Relaxed),
            stale_discarded: self.stale_discarded.load(Ordering::Relaxed),
            last_failure: self
                .last_failure
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
