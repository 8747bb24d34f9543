//! Outcome and error taxonomy of a normalization attempt.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::{
    AnchorPoint, BlankTextError, CalendarError, OutputFormat, TemporalText, TimeoutRangeError,
};

/// Failure reported by a grammar engine across the worker boundary.
///
/// Only the textual description survives the boundary; the kind of failure
/// must be recovered from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{description}")]
pub struct EngineFailure {
    description: String,
}

impl EngineFailure {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// One normalization, fully validated and ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationRequest {
    text: TemporalText,
    anchor: AnchorPoint,
    output_format: OutputFormat,
}

impl NormalizationRequest {
    #[must_use]
    pub fn new(text: TemporalText, anchor: AnchorPoint, output_format: OutputFormat) -> Self {
        Self {
            text,
            anchor,
            output_format,
        }
    }

    #[must_use]
    pub fn text(&self) -> &TemporalText {
        &self.text
    }

    #[must_use]
    pub fn anchor(&self) -> &AnchorPoint {
        &self.anchor
    }

    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Unsupported,
    TimedOut,
    InvalidInput,
}

impl OutcomeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OutcomeKind::Success => "success",
            OutcomeKind::Unsupported => "unsupported",
            OutcomeKind::TimedOut => "timed_out",
            OutcomeKind::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one normalization attempt, before a failure policy is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(String),
    Unsupported {
        text: String,
        cause: EngineFailure,
    },
    TimedOut {
        text: String,
        timeout_ms: u64,
    },
    InvalidInput {
        reason: String,
        cause: Option<CalendarError>,
    },
}

impl Outcome {
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Success(_) => OutcomeKind::Success,
            Outcome::Unsupported { .. } => OutcomeKind::Unsupported,
            Outcome::TimedOut { .. } => OutcomeKind::TimedOut,
            Outcome::InvalidInput { .. } => OutcomeKind::InvalidInput,
        }
    }

    /// Strict reading: every non-success outcome becomes an error.
    pub fn into_result(self) -> Result<String, NormalizeError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Unsupported { text, cause } => Err(NormalizeError::Unsupported { text, cause }),
            Outcome::TimedOut { text, timeout_ms } => {
                Err(NormalizeError::TimedOut { text, timeout_ms })
            }
            Outcome::InvalidInput { reason, cause } => {
                Err(NormalizeError::InvalidInput { reason, cause })
            }
        }
    }
}

impl From<BlankTextError> for Outcome {
    fn from(err: BlankTextError) -> Self {
        Outcome::InvalidInput {
            reason: err.to_string(),
            cause: None,
        }
    }
}

impl From<CalendarError> for Outcome {
    fn from(err: CalendarError) -> Self {
        Outcome::InvalidInput {
            reason: format!("Invalid anchor date: {err}"),
            cause: Some(err),
        }
    }
}

/// Caller-facing failure of a normalizer operation.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{reason}")]
    InvalidInput {
        reason: String,
        #[source]
        cause: Option<CalendarError>,
    },
    #[error("Unable to normalize temporal expression {text}")]
    Unsupported {
        text: String,
        #[source]
        cause: EngineFailure,
    },
    #[error("Normalization timed out at {timeout_ms} milliseconds on temporal expression {text}")]
    TimedOut { text: String, timeout_ms: u64 },
    #[error("normalizer is closed")]
    Disposed,
    #[error("failed to start normalization worker")]
    WorkerSpawn(#[source] io::Error),
}

impl NormalizeError {
    /// Taxonomy kind for per-call failures; `None` for lifecycle errors.
    #[must_use]
    pub const fn kind(&self) -> Option<OutcomeKind> {
        match self {
            NormalizeError::InvalidInput { .. } => Some(OutcomeKind::InvalidInput),
            NormalizeError::Unsupported { .. } => Some(OutcomeKind::Unsupported),
            NormalizeError::TimedOut { .. } => Some(OutcomeKind::TimedOut),
            NormalizeError::Disposed | NormalizeError::WorkerSpawn(_) => None,
        }
    }
}

impl From<TimeoutRangeError> for NormalizeError {
    fn from(err: TimeoutRangeError) -> Self {
        NormalizeError::InvalidInput {
            reason: err.to_string(),
            cause: None,
        }
    }
}
