//! Resolved normalizer configuration types shared across crates.
//!
//! These types represent fully-validated configuration state. Raw TOML
//! sections (with `Option` fields) stay in `timex-config`, which resolves
//! them into these types at the parse boundary.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Timeout must be between 100 and 10000 milliseconds, got {value}")]
pub struct TimeoutRangeError {
    pub value: u64,
}

/// Wall-clock budget for a single normalization attempt.
///
/// Invariant: `MIN <= millis <= MAX`, enforced at construction and at the
/// deserialization boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u64")]
pub struct TimeoutMillis(u64);

impl TimeoutMillis {
    pub const MIN: u64 = 100;
    pub const MAX: u64 = 10_000;
    pub const DEFAULT: Self = Self(1_000);

    pub fn new(millis: u64) -> Result<Self, TimeoutRangeError> {
        if (Self::MIN..=Self::MAX).contains(&millis) {
            Ok(Self(millis))
        } else {
            Err(TimeoutRangeError { value: millis })
        }
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn as_duration(self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for TimeoutMillis {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u64> for TimeoutMillis {
    type Error = TimeoutRangeError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for TimeoutMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {setting} '{value}' (expected one of: {expected})")]
pub struct ParseSettingError {
    pub setting: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Shape of a successful normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Compact calendar value, e.g. `2012-05-13`.
    #[default]
    Simple,
    /// Full operator structure, e.g.
    /// `TimeSpan(2026-06-15T00:00Z,2026-06-16T00:00Z,Period(Map(Days -> 1),Exact),Exact)`.
    Structured,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Simple => "simple",
            OutputFormat::Structured => "structured",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(OutputFormat::Simple),
            "structured" => Ok(OutputFormat::Structured),
            _ => Err(ParseSettingError {
                setting: "output format",
                value: s.to_string(),
                expected: "simple, structured",
            }),
        }
    }
}

/// How per-call failures reach the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Every failure is returned as an error with a descriptive message.
    #[default]
    Strict,
    /// Failures collapse to an empty result; detail goes to diagnostics only.
    Lenient,
}

impl FailurePolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FailurePolicy::Strict => "strict",
            FailurePolicy::Lenient => "lenient",
        }
    }
}

impl FromStr for FailurePolicy {
    type Err = ParseSettingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(FailurePolicy::Strict),
            "lenient" => Ok(FailurePolicy::Lenient),
            _ => Err(ParseSettingError {
                setting: "failure policy",
                value: s.to_string(),
                expected: "strict, lenient",
            }),
        }
    }
}

/// Construction-time settings of one normalizer. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizerConfig {
    pub timeout: TimeoutMillis,
    pub output_format: OutputFormat,
    pub failure_policy: FailurePolicy,
}
