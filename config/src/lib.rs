//! Configuration loading for Paralyze.
//!
//! ```toml
//! [executor]
//! concurrency_limit = 4   # 0 = unbounded
//! timeout_ms = 500        # 0 = no timeout
//!
//! [speculation]
//! stagger_ms = 10
//! fallback_on_error = true
//! ```
//!
//! Every section and key is optional. Environment variables
//! (`PARALYZE_CONCURRENCY_LIMIT`, `PARALYZE_TIMEOUT_MS`, `PARALYZE_STAGGER_MS`)
//! override file values when applied through [`ParalyzeConfig::apply_env_overrides`].

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use paralyze_types::{ConcurrencyLimit, InvalidStagger, StaggerInterval};

pub const ENV_CONCURRENCY_LIMIT: &str = "PARALYZE_CONCURRENCY_LIMIT";
pub const ENV_TIMEOUT_MS: &str = "PARALYZE_TIMEOUT_MS";
pub const ENV_STAGGER_MS: &str = "PARALYZE_STAGGER_MS";

const DEFAULT_STAGGER_MS: u64 = 10;

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

const fn default_stagger_ms() -> u64 {
    DEFAULT_STAGGER_MS
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ParalyzeConfig {
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub speculation: SpeculationConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExecutorConfig {
    /// Maximum tasks in flight. Default: 0 (unbounded).
    #[serde(default)]
    pub concurrency_limit: ConcurrencyLimit,
    /// Aggregate timeout for a call in milliseconds. Default: 0 (none).
    #[serde(default)]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SpeculationConfig {
    /// Delay before hedging to the next candidate. Default: 10ms. Must be > 0.
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Move on to the next candidate when one fails. Default: true.
    #[serde(default = "default_true")]
    pub fallback_on_error: bool,
}

impl Default for SpeculationConfig {
    fn default() -> Self {
        Self {
            stagger_ms: DEFAULT_STAGGER_MS,
            fallback_on_error: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {var}: expected a non-negative integer")]
    Env { var: &'static str, value: String },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Env { .. } => None,
        }
    }
}

impl ParalyzeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from `path`.
    ///
    /// A missing file is not an error and yields `Ok(None)`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match Self::from_toml_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Override file values with `PARALYZE_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(limit) = parse_override(&lookup, ENV_CONCURRENCY_LIMIT)? {
            self.executor.concurrency_limit = ConcurrencyLimit::new(limit);
        }
        if let Some(timeout_ms) = parse_override(&lookup, ENV_TIMEOUT_MS)? {
            self.executor.timeout_ms = timeout_ms;
        }
        if let Some(stagger_ms) = parse_override(&lookup, ENV_STAGGER_MS)? {
            self.speculation.stagger_ms = stagger_ms;
        }
        Ok(())
    }

    #[must_use]
    pub fn concurrency_limit(&self) -> ConcurrencyLimit {
        self.executor.concurrency_limit
    }

    /// Aggregate call timeout; `Duration::ZERO` disables it.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.executor.timeout_ms)
    }

    pub fn stagger(&self) -> Result<StaggerInterval, InvalidStagger> {
        StaggerInterval::from_millis(self.speculation.stagger_ms)
    }

    #[must_use]
    pub fn fallback_on_error(&self) -> bool {
        self.speculation.fallback_on_error
    }
}

fn parse_override<F, V>(lookup: &F, var: &'static str) -> Result<Option<V>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    V: FromStr,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<V>() {
        Ok(value) => {
            tracing::debug!(var, value = trimmed, "Applying environment override");
            Ok(Some(value))
        }
        Err(_) => Err(ConfigError::Env { var, value: raw }),
    }
}
