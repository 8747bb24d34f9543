//! Outcome classification and failure policy.
//!
//! Engine failures cross the worker boundary as text, so their kind is
//! recovered by matching the description against [`FAILURE_CLASSES`].

use std::error::Error;

use tracing::{debug, warn};

use timex_types::{FailurePolicy, NormalizationRequest, NormalizeError, Outcome, TimeoutMillis};

use crate::diagnostics::Diagnostics;
use crate::worker::TaskOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Unsupported,
    TimedOut,
}

/// Description fragments, matched case-insensitively, first match wins.
///
/// A description matching none of these is `Unsupported`. A new engine
/// message that actually means "timed out" will be misfiled until it is
/// added here.
pub const FAILURE_CLASSES: &[(&str, FailureClass)] = &[
    ("unsupportedoperationexception", FailureClass::Unsupported),
    ("unsupported", FailureClass::Unsupported),
    ("no parse", FailureClass::Unsupported),
    ("interruptedexception", FailureClass::TimedOut),
    ("interrupted", FailureClass::TimedOut),
    ("timed out", FailureClass::TimedOut),
    ("deadline exceeded", FailureClass::TimedOut),
];

#[must_use]
pub fn classify_failure(description: &str) -> FailureClass {
    let lower = description.to_ascii_lowercase();
    FAILURE_CLASSES
        .iter()
        .find(|(fragment, _)| lower.contains(fragment))
        .map_or(FailureClass::Unsupported, |(_, class)| *class)
}

/// Map a worker result onto the outcome taxonomy.
#[must_use]
pub fn classify(
    task: TaskOutcome,
    request: &NormalizationRequest,
    timeout: TimeoutMillis,
) -> Outcome {
    let text = request.text().original().to_string();
    match task {
        TaskOutcome::Finished(Ok(temporal)) => {
            Outcome::Success(temporal.render(request.output_format()))
        }
        TaskOutcome::Finished(Err(failure)) => match classify_failure(failure.description()) {
            FailureClass::Unsupported => Outcome::Unsupported {
                text,
                cause: failure,
            },
            FailureClass::TimedOut => Outcome::TimedOut {
                text,
                timeout_ms: timeout.as_millis(),
            },
        },
        TaskOutcome::DeadlineExceeded => Outcome::TimedOut {
            text,
            timeout_ms: timeout.as_millis(),
        },
    }
}

/// Apply the failure policy: strict returns the error, lenient returns an
/// empty string and leaves the detail in `diagnostics` and the log.
pub fn settle(
    outcome: Outcome,
    policy: FailurePolicy,
    diagnostics: &Diagnostics,
) -> Result<String, NormalizeError> {
    let kind = outcome.kind();
    let err = match outcome.into_result() {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };
    diagnostics.record_failure(describe(&err));

    match policy {
        FailurePolicy::Strict => {
            debug!(%kind, error = %err, "normalization failed");
            Err(err)
        }
        FailurePolicy::Lenient => {
            warn!(%kind, error = %err, "normalization failed, returning empty result");
            Ok(String::new())
        }
    }
}

/// Error message with its cause chain, `": "`-separated.
fn describe(err: &NormalizeError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
