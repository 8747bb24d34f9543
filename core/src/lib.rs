//! Bounded-time normalization of temporal expressions.
//!
//! ```text
//! Normalizer::normalize*(text, anchor)
//!   -> TemporalText / AnchorResolver     (InvalidInput, never reaches the engine)
//!   -> Worker::run                       (one blocking loop, per-call deadline)
//!   -> classify::classify                (Success | Unsupported | TimedOut)
//!   -> classify::settle                  (Strict: Err, Lenient: "")
//! ```
//!
//! The engine is pluggable through [`TemporalEngine`]; [`RuleEngine`] is the
//! default.

#![allow(clippy::missing_errors_doc)]

mod anchor;
pub mod classify;
mod diagnostics;
mod normalizer;
mod worker;

pub use anchor::{AnchorResolver, AnchorSpec, Clock, FixedClock, SystemClock};
pub use diagnostics::{Diagnostics, DiagnosticsSnapshot};
pub use normalizer::{Lifecycle, Normalizer, NormalizerBuilder};
pub use worker::{Occupancy, TaskOutcome, Worker, WorkerClosed};

pub use timex_engine::{
    CancellationToken, EngineFailure, INTERRUPTED, RuleEngine, Temporal, TemporalEngine,
    checkpoint,
};
pub use timex_types::{
    AnchorPoint, CalendarError, FailurePolicy, NormalizeError, NormalizerConfig, Outcome,
    OutcomeKind, OutputFormat, TimeoutMillis,
};
