//! Demo settings.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `RUST_LOG` | `info` | `tracing` filter directives |
//! | `VOW_LOG_FORMAT` | `pretty` | `pretty`, `compact` or `json` |
//! | `VOW_DEMO_DELAY_MS` | `1000` | length of the timer scenario |

use core::str::FromStr;
use core::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Invalid demo setting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `VOW_LOG_FORMAT` named an unknown format.
    #[error("unknown log format `{0}` (expected pretty, compact or json)")]
    UnknownFormat(String),

    /// `VOW_DEMO_DELAY_MS` was not a whole number of milliseconds.
    #[error("invalid delay `{0}`: expected milliseconds")]
    InvalidDelay(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// LogFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat(value.to_owned())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DemoConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Settings for the `vow-demo` binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// `tracing` filter directives.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Duration of the timer scenario.
    pub delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            format: LogFormat::Pretty,
            delay: Duration::from_millis(1000),
        }
    }
}

impl DemoConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(filter) = lookup("RUST_LOG") {
            config.filter = filter;
        }
        if let Some(format) = lookup("VOW_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(delay) = lookup("VOW_DEMO_DELAY_MS") {
            let millis = delay
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidDelay(delay.clone()))?;
            config.delay = Duration::from_millis(millis);
        }
        Ok(config)
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the timer scenario's duration.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Installs the global `tracing` subscriber.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_tracing(&self) {
        let env_filter = EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"));

        // try_init().ok() ignores errors if already initialized
        match self.format {
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .try_init()
                    .ok();
            }
            LogFormat::Compact => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().compact())
                    .try_init()
                    .ok();
            }
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json())
                    .try_init()
                    .ok();
            }
        }

        tracing::debug!(filter = %self.filter, format = ?self.format, "tracing initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = DemoConfig::from_lookup(lookup(&[])).expect("valid config");
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = DemoConfig::from_lookup(lookup(&[
            ("RUST_LOG", "vow_core=trace"),
            ("VOW_LOG_FORMAT", "JSON"),
            ("VOW_DEMO_DELAY_MS", "250"),
        ]))
        .expect("valid config");

        assert_eq!(config.filter, "vow_core=trace");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.delay, Duration::from_millis(250));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            DemoConfig::from_lookup(lookup(&[("VOW_LOG_FORMAT", "xml")])),
            Err(ConfigError::UnknownFormat("xml".into()))
        );
        assert_eq!(
            DemoConfig::from_lookup(lookup(&[("VOW_DEMO_DELAY_MS", "soon")])),
            Err(ConfigError::InvalidDelay("soon".into()))
        );
    }

    #[test]
    fn builders_override_fields() {
        let config = DemoConfig::default()
            .with_format(LogFormat::Compact)
            .with_delay(Duration::from_millis(5));

        assert_eq!(config.format, LogFormat::Compact);
        assert_eq!(config.delay, Duration::from_millis(5));
    }
}
