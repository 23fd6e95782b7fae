//! Resolver configuration.
//!
//! Every wait in Sondear is expressed in *time units* so a suite can run the
//! same timeouts at full scale (1 unit = 1 second) or compressed for fast
//! unit tests.

use crate::result::{SondearError, SondearResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default length of one time unit (1 second)
pub const DEFAULT_TIME_UNIT_MS: u64 = 1_000;

/// Default wait timeout, in units
pub const DEFAULT_WAIT_UNITS: u32 = 5;

/// Default polling interval, in units
pub const DEFAULT_POLL_UNITS: u32 = 1;

/// Default number of edge-probe polls
pub const DEFAULT_EDGE_PROBE_ATTEMPTS: u32 = 5;

/// Default resolve retry budget
pub const DEFAULT_MAX_RESOLVE_ATTEMPTS: u32 = 10;

/// What to do when the cache already holds a live handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheHitPolicy {
    /// Return the cached handle as soon as it probes live
    #[default]
    Trust,
    /// Also check the requested state; re-query when it does not hold
    Verify,
}

/// Configuration for resolution and waiting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Length of one time unit in milliseconds
    pub time_unit_ms: u64,
    /// Timeout of the shared adaptive wait, in units
    pub default_timeout_units: u32,
    /// Poll interval of every wait, in units
    pub poll_interval_units: u32,
    /// How many times the edge-probe looks for the selector (one per unit)
    pub edge_probe_attempts: u32,
    /// Maximum resolve attempts before giving up
    pub max_resolve_attempts: u32,
    /// Wall-clock bound on a single resolve, in units
    pub resolve_deadline_units: u32,
    /// Cache-hit behaviour
    pub cache_hit_policy: CacheHitPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            time_unit_ms: DEFAULT_TIME_UNIT_MS,
            default_timeout_units: DEFAULT_WAIT_UNITS,
            poll_interval_units: DEFAULT_POLL_UNITS,
            edge_probe_attempts: DEFAULT_EDGE_PROBE_ATTEMPTS,
            max_resolve_attempts: DEFAULT_MAX_RESOLVE_ATTEMPTS,
            resolve_deadline_units: DEFAULT_WAIT_UNITS * 2,
            cache_hit_policy: CacheHitPolicy::Trust,
        }
    }
}

impl ResolverConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the length of one time unit
    #[must_use]
    pub const fn with_time_unit_ms(mut self, ms: u64) -> Self {
        self.time_unit_ms = ms;
        self
    }

    /// Set the adaptive wait timeout
    #[must_use]
    pub const fn with_default_timeout_units(mut self, units: u32) -> Self {
        self.default_timeout_units = units;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval_units(mut self, units: u32) -> Self {
        self.poll_interval_units = units;
        self
    }

    /// Set the number of edge-probe polls
    #[must_use]
    pub const fn with_edge_probe_attempts(mut self, attempts: u32) -> Self {
        self.edge_probe_attempts = attempts;
        self
    }

    /// Set the resolve retry budget
    #[must_use]
    pub const fn with_max_resolve_attempts(mut self, attempts: u32) -> Self {
        self.max_resolve_attempts = attempts;
        self
    }

    /// Set the resolve deadline
    #[must_use]
    pub const fn with_resolve_deadline_units(mut self, units: u32) -> Self {
        self.resolve_deadline_units = units;
        self
    }

    /// Set the cache-hit policy
    #[must_use]
    pub const fn with_cache_hit_policy(mut self, policy: CacheHitPolicy) -> Self {
        self.cache_hit_policy = policy;
        self
    }

    /// One time unit
    #[must_use]
    pub const fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    /// `n` time units
    #[must_use]
    pub const fn units(&self, n: u32) -> Duration {
        Duration::from_millis(self.time_unit_ms.saturating_mul(n as u64))
    }

    /// Adaptive wait timeout
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        self.units(self.default_timeout_units)
    }

    /// Poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.units(self.poll_interval_units)
    }

    /// Resolve deadline
    #[must_use]
    pub const fn resolve_deadline(&self) -> Duration {
        self.units(self.resolve_deadline_units)
    }

    /// Reject settings that would make waits meaningless
    pub fn validate(&self) -> SondearResult<()> {
        if self.time_unit_ms == 0 {
            return Err(SondearError::config("time_unit_ms must be greater than zero"));
        }
        if self.default_timeout_units == 0 {
            return Err(SondearError::config(
                "default_timeout_units must be greater than zero",
            ));
        }
        if self.poll_interval_units == 0 {
            return Err(SondearError::config("poll_interval_units must be greater than zero"));
        }
        if self.max_resolve_attempts == 0 {
            return Err(SondearError::config(
                "max_resolve_attempts must be greater than zero",
            ));
        }
        if self.resolve_deadline_units == 0 {
            return Err(SondearError::config(
                "resolve_deadline_units must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> SondearResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> SondearResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file
    pub fn from_path(path: impl AsRef<Path>) -> SondearResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            _ => Err(SondearError::config(format!(
                "unsupported config file extension: {}",
                path.display()
            ))),
        }
    }
}
