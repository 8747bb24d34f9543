//! Grammar engine contract for timex.
//!
//! The normalizer treats the natural-language grammar as an opaque
//! collaborator behind [`TemporalEngine`]. Engines run on a dedicated worker
//! thread and may be abandoned mid-call when the caller's deadline passes; the
//! only cancellation channel is the cooperative [`CancellationToken`] handed to
//! each call.
//!
//! [`RuleEngine`] is a small deterministic English grammar used by the CLI and
//! the test suite. It is not meant to be complete.

mod cancel;
mod rules;
mod temporal;

use std::sync::Arc;

pub use cancel::{INTERRUPTED, checkpoint};
pub use rules::RuleEngine;
pub use temporal::{PeriodUnit, Temporal};
pub use timex_types::EngineFailure;
pub use tokio_util::sync::CancellationToken;

use timex_types::AnchorPoint;

/// A natural-language temporal grammar.
///
/// `text` is already whitespace-collapsed and non-blank. Implementations
/// should poll `cancel` (see [`checkpoint`]) during long work and return early
/// once it fires; an engine that ignores it keeps the worker busy until it
/// returns.
///
/// Failures carry only a description. Expressions outside the grammar should
/// mention "unsupported" in the description so they classify correctly.
pub trait TemporalEngine: Send + Sync {
    fn parse(
        &self,
        text: &str,
        anchor: &AnchorPoint,
        cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure>;
}

impl<E: TemporalEngine + ?Sized> TemporalEngine for Arc<E> {
    fn parse(
        &self,
        text: &str,
        anchor: &AnchorPoint,
        cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        (**self).parse(text, anchor, cancel)
    }
}

impl<E: TemporalEngine + ?Sized> TemporalEngine for Box<E> {
    fn parse(
        &self,
        text: &str,
        anchor: &AnchorPoint,
        cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        (**self).parse(text, anchor, cancel)
    }
}
