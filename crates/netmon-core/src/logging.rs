#![forbid(unsafe_code)]

//! Logging setup.
//!
//! Library code only emits `tracing` events. Binaries and test harnesses may
//! call [`init_subscriber`] once to install a formatter filtered by the
//! `NETMON_LOG` directive (same syntax as `RUST_LOG`).
//!
//! # Failure Modes
//!
//! - An unparseable directive falls back to [`DEFAULT_DIRECTIVE`].
//! - A second install returns [`LoggingError::SubscriberAlreadySet`].

use std::env;
use std::fmt;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the filter directive.
pub const ENV_LOG: &str = "NETMON_LOG";

/// Environment variable selecting JSON output (`1`/`true`).
pub const ENV_LOG_JSON: &str = "NETMON_LOG_JSON";

/// Directive used when none is configured.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `netmon_runtime=debug`.
    pub directive: String,
    /// Emit one JSON object per event. Requires the `tracing-json` feature;
    /// ignored otherwise.
    pub json: bool,
    /// Include the event target in each line.
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directive: DEFAULT_DIRECTIVE.to_owned(),
            json: false,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = directive.into();
        self
    }

    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    #[must_use]
    pub fn with_target(mut self, show_target: bool) -> Self {
        self.show_target = show_target;
        self
    }

    /// Read `NETMON_LOG` and `NETMON_LOG_JSON`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Read settings through a custom lookup (for tests).
    pub fn from_env_with<F>(mut get: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(directive) = get(ENV_LOG).filter(|d| !d.trim().is_empty()) {
            config.directive = directive;
        }
        if let Some(json) = get(ENV_LOG_JSON) {
            config.json = matches!(json.trim(), "1" | "true" | "yes" | "on");
        }
        config
    }

    /// Build the filter, falling back to [`DEFAULT_DIRECTIVE`] when the
    /// configured directive does not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directive).unwrap_or_else(|err| {
            tracing::warn!(directive = %self.directive, error = %err, "invalid log directive");
            EnvFilter::new(DEFAULT_DIRECTIVE)
        })
    }
}

/// Install the global subscriber.
pub fn init_subscriber(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter();
    let registry = tracing_subscriber::registry().with(filter);

    #[cfg(feature = "tracing-json")]
    {
        if config.json {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_target(config.show_target);
            return registry
                .with(layer)
                .try_init()
                .map_err(|_| LoggingError::SubscriberAlreadySet);
        }
    }

    let layer = tracing_subscriber::fmt::layer().with_target(config.show_target);
    registry
        .with(layer)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)?;
    tracing::debug!(directive = %config.directive, "logging installed");
    Ok(())
}

/// Subscriber installation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingError {
    /// A global subscriber is already installed.
    SubscriberAlreadySet,
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberAlreadySet => write!(f, "a global tracing subscriber is already set"),
        }
    }
}

impl std::error::Error for LoggingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_warn() {
        let config = LoggingConfig::from_env_with(|_| None);
        assert_eq!(config, LoggingConfig::default());
        assert_eq!(config.directive, "warn");
        assert!(!config.json);
    }

    #[test]
    fn env_values_apply() {
        let config = LoggingConfig::from_env_with(|key| match key {
            ENV_LOG => Some("netmon_runtime=debug".to_owned()),
            ENV_LOG_JSON => Some("1".to_owned()),
            _ => None,
        });
        assert_eq!(config.directive, "netmon_runtime=debug");
        assert!(config.json);
    }

    #[test]
    fn blank_directive_keeps_default() {
        let config = LoggingConfig::from_env_with(|key| (key == ENV_LOG).then(|| "  ".to_owned()));
        assert_eq!(config.directive, DEFAULT_DIRECTIVE);
    }

    #[test]
    fn bad_directive_falls_back() {
        let config = LoggingConfig::default().with_directive("[[[");
        // Must not panic.
        let _ = config.env_filter();
    }

    #[test]
    fn second_install_fails() {
        let config = LoggingConfig::default().with_target(false);
        let first = init_subscriber(&config);
        let second = init_subscriber(&config);
        // Another test binary may have installed one already; either way the
        // second attempt must be rejected.
        assert!(first.is_ok() || first == Err(LoggingError::SubscriberAlreadySet));
        assert_eq!(second, Err(LoggingError::SubscriberAlreadySet));
    }
}
