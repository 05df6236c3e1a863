//! Harness configuration.

use crate::errors::ConfigError;
use crate::flow::DEFAULT_MAX_STEPS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`HarnessConfig::max_steps`].
pub const ENV_MAX_STEPS: &str = "FLOWHARNESS_MAX_STEPS";
/// Environment variable overriding [`HarnessConfig::session_ttl_secs`].
pub const ENV_SESSION_TTL_SECS: &str = "FLOWHARNESS_SESSION_TTL_SECS";
/// Environment variable overriding [`HarnessConfig::reap_interval_secs`].
pub const ENV_REAP_INTERVAL_SECS: &str = "FLOWHARNESS_REAP_INTERVAL_SECS";

/// Configuration shared by the harness, the session store and the reaper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Bound on consecutive sub-steps within one step call.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Idle time after which a session is dropped.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// How often expired sessions are purged.
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

fn default_session_ttl() -> u64 {
    30 * 60
}

fn default_reap_interval() -> u64 {
    60
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            session_ttl_secs: default_session_ttl(),
            reap_interval_secs: default_reap_interval(),
        }
    }
}

impl HarnessConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the step bound.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the session TTL in seconds.
    #[must_use]
    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    /// Sets the reap interval in seconds.
    #[must_use]
    pub fn with_reap_interval_secs(mut self, secs: u64) -> Self {
        self.reap_interval_secs = secs;
        self
    }

    /// Gets the session TTL as a Duration.
    #[must_use]
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    /// Gets the reap interval as a Duration.
    #[must_use]
    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }

    /// Defaults overridden by `FLOWHARNESS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_MAX_STEPS) {
            config.max_steps = parse(ENV_MAX_STEPS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SESSION_TTL_SECS) {
            config.session_ttl_secs = parse(ENV_SESSION_TTL_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_REAP_INTERVAL_SECS) {
            config.reap_interval_secs = parse(ENV_REAP_INTERVAL_SECS, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks that every bound is positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("max_steps", self.max_steps as u64),
            ("session_ttl_secs", self.session_ttl_secs),
            ("reap_interval_secs", self.reap_interval_secs),
        ];
        for (key, value) in checks {
            if value == 0 {
                return Err(ConfigError::new(key, "0", "must be at least 1"));
            }
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|err: T::Err| ConfigError::new(key, raw, err.to_string()))
}
