//! Log subscriber setup.
//!
//! Sondear only emits `tracing` events; installing a subscriber is left to
//! the test binary. [`init_logging`] is a convenience for the common case.
//! The filter comes from `SONDEAR_LOG`, then `RUST_LOG`, then
//! [`LogConfig::level`].

use crate::result::{SondearError, SondearResult};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Environment variable consulted first for the log filter
pub const LOG_ENV: &str = "SONDEAR_LOG";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Fallback filter directive when no env var is set
    pub level: String,
    /// Output format
    pub format: LogFormat,
    /// Include the event target (module path)
    pub with_target: bool,
    /// Write through the test harness's captured output
    pub test_writer: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_target: false,
            test_writer: false,
        }
    }
}

impl LogConfig {
    /// Create default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for unit tests: debug level, captured output
    #[must_use]
    pub fn for_tests() -> Self {
        Self {
            level: "sondear=debug".to_string(),
            test_writer: true,
            ..Self::default()
        }
    }

    /// Set the fallback filter
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Set the output format
    #[must_use]
    pub const fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Build the effective filter
    pub fn filter(&self) -> SondearResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
            return Ok(filter);
        }
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level)
            .map_err(|e| SondearError::config(format!("invalid log filter '{}': {e}", self.level)))
    }
}

/// Install a global subscriber.
///
/// Returns `Ok(false)` when a subscriber is already installed, so calling it
/// from every test is harmless.
pub fn init_logging(config: &LogConfig) -> SondearResult<bool> {
    let filter = config.filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target);

    let installed = match (config.format, config.test_writer) {
        (LogFormat::Pretty, false) => builder.try_init().is_ok(),
        (LogFormat::Pretty, true) => builder.with_test_writer().try_init().is_ok(),
        (LogFormat::Json, false) => builder.json().try_init().is_ok(),
        (LogFormat::Json, true) => builder.json().with_test_writer().try_init().is_ok(),
    };
    Ok(installed)
}
