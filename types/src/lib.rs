//! Core domain types for timex.
//!
//! This crate contains pure domain types with no IO, no threads, and minimal
//! dependencies. Everything here can be used from any layer of the workspace.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod anchor;
mod outcome;
mod settings;
mod text;

pub use anchor::{AnchorPoint, CalendarError, Granularity};
pub use outcome::{EngineFailure, NormalizationRequest, NormalizeError, Outcome, OutcomeKind};
pub use settings::{
    FailurePolicy, NormalizerConfig, OutputFormat, ParseSettingError, TimeoutMillis,
    TimeoutRangeError,
};
pub use text::{BlankTextError, TemporalText, collapse_whitespace};
