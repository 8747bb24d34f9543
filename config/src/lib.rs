//! Layered normalizer settings.
//!
//! Precedence, lowest to highest: built-in defaults, `~/.timex/config.toml`,
//! `TIMEX_*` environment variables. Command-line flags are applied on top by
//! the binary.
//!
//! ```toml
//! [normalizer]
//! timeout_ms = 1500
//! output_format = "structured"
//! failure_policy = "lenient"
//! ```

#![allow(clippy::missing_errors_doc)]

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use timex_types::{FailurePolicy, NormalizerConfig, OutputFormat, TimeoutMillis};

pub const ENV_TIMEOUT_MS: &str = "TIMEX_TIMEOUT_MS";
pub const ENV_OUTPUT_FORMAT: &str = "TIMEX_OUTPUT_FORMAT";
pub const ENV_FAILURE_POLICY: &str = "TIMEX_FAILURE_POLICY";

#[derive(Debug, Default, Deserialize)]
pub struct TimexConfig {
    pub normalizer: Option<NormalizerSection>,
}

/// `[normalizer]` table. Absent keys keep the value from the layer below.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct NormalizerSection {
    /// Rejected at parse time outside `[100, 10000]`.
    pub timeout_ms: Option<TimeoutMillis>,
    pub output_format: Option<OutputFormat>,
    pub failure_policy: Option<FailurePolicy>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::InvalidEnv { .. } => None,
        }
    }
}

impl TimexConfig {
    /// Load from the default location. `Ok(None)` when there is no home
    /// directory or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!(path = %path.display(), error = %source, "failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// File values layered over the built-in defaults.
    #[must_use]
    pub fn normalizer_config(&self) -> NormalizerConfig {
        let mut config = NormalizerConfig::default();
        if let Some(section) = self.normalizer {
            if let Some(timeout) = section.timeout_ms {
                config.timeout = timeout;
            }
            if let Some(format) = section.output_format {
                config.output_format = format;
            }
            if let Some(policy) = section.failure_policy {
                config.failure_policy = policy;
            }
        }
        config
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".timex").join("config.toml"))
}

/// Apply `TIMEX_*` overrides read through `lookup`.
///
/// Empty values are ignored. Malformed ones are an error rather than being
/// silently dropped.
pub fn apply_env_overrides(
    mut config: NormalizerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<NormalizerConfig, ConfigError> {
    let read = |var: &'static str| lookup(var).filter(|value| !value.trim().is_empty());

    if let Some(value) = read(ENV_TIMEOUT_MS) {
        let millis = value
            .trim()
            .parse::<u64>()
            .map_err(|err| invalid_env(ENV_TIMEOUT_MS, &value, err))?;
        config.timeout =
            TimeoutMillis::new(millis).map_err(|err| invalid_env(ENV_TIMEOUT_MS, &value, err))?;
    }
    if let Some(value) = read(ENV_OUTPUT_FORMAT) {
        config.output_format = value
            .parse()
            .map_err(|err| invalid_env(ENV_OUTPUT_FORMAT, &value, err))?;
    }
    if let Some(value) = read(ENV_FAILURE_POLICY) {
        config.failure_policy = value
            .parse()
            .map_err(|err| invalid_env(ENV_FAILURE_POLICY, &value, err))?;
    }
    Ok(config)
}

/// Defaults, then `file`, then the process environment.
pub fn resolve(file: Option<&TimexConfig>) -> Result<NormalizerConfig, ConfigError> {
    let base = file.map_or_else(NormalizerConfig::default, TimexConfig::normalizer_config);
    apply_env_overrides(base, |var| env::var(var).ok())
}

fn invalid_env(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::InvalidEnv {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
