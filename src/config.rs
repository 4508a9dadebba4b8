//! Configuration for port construction.
//!
//! Ports are wired at bootstrap, typically from a deployment profile.
//! Loading is layered: defaults, then environment overrides, then explicit
//! values set by the wiring code. Parsing is intentionally minimal and
//! deterministic.

use thiserror::Error;

use crate::error::TaggedError;

/// Default concurrency limit: one in-flight handler invocation, strictly
/// sequential dispatch.
pub const DEFAULT_PORT_CONCURRENCY: usize = 1;

/// Environment variable overriding the default port concurrency.
pub const PORT_CONCURRENCY_ENV: &str = "INTERLAY_PORT_CONCURRENCY";

/// Construction parameters for a [`Port`](crate::port::Port).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfig {
    /// Maximum in-flight handler invocations. Must be at least 1.
    pub concurrency: usize,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_PORT_CONCURRENCY,
        }
    }
}

impl PortConfig {
    /// Creates a configuration with the given concurrency limit.
    #[must_use]
    pub fn new(concurrency: usize) -> Self {
        Self { concurrency }
    }

    /// Validates the configuration for basic sanity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Loads the configuration from the environment, falling back to
    /// defaults when no override is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(PORT_CONCURRENCY_ENV) {
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(std::env::VarError::NotUnicode(raw)) => Err(ConfigError::InvalidEnv {
                var: PORT_CONCURRENCY_ENV,
                value: raw.to_string_lossy().into_owned(),
            }),
            Ok(raw) => {
                let concurrency =
                    raw.trim()
                        .parse::<usize>()
                        .map_err(|_| ConfigError::InvalidEnv {
                            var: PORT_CONCURRENCY_ENV,
                            value: raw.clone(),
                        })?;
                let config = Self { concurrency };
                config.validate()?;
                Ok(config)
            }
        }
    }
}

/// Configuration error (invalid env var, out-of-range value).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Port concurrency must be at least 1.
    #[error("port concurrency must be at least 1")]
    ZeroConcurrency,
    /// An environment override did not parse.
    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// The offending variable.
        var: &'static str,
        /// The raw value found.
        value: String,
    },
}

impl TaggedError for ConfigError {
    fn tag(&self) -> &str {
        "ConfigError"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sequential_and_valid() {
        let config = PortConfig::default();
        assert_eq!(config.concurrency, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        assert_eq!(
            PortConfig::new(0).validate(),
            Err(ConfigError::ZeroConcurrency)
        );
    }

    #[test]
    fn config_error_is_tagged() {
        assert_eq!(ConfigError::ZeroConcurrency.tag(), "ConfigError");
    }

    // mutating the process environment is unsafe under edition 2024, so
    // only the no-override path is exercised here
    #[test]
    fn from_env_without_override_is_the_default() {
        assert_eq!(PortConfig::from_env(), Ok(PortConfig::default()));
    }
}
