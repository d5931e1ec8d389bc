//! # Settings
//!
//! Layered service configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. optional file `config/rate-compare.{toml,yaml,json}`
//! 3. environment variables prefixed `RATE_COMPARE__`, `__` between keys,
//!    e.g. `RATE_COMPARE__PROVIDERS__API3__FAILURE_PROBABILITY=0.0`
//!
//! `.env` files are loaded by the binary before [`Settings::load`] runs.

use crate::infrastructure::providers::simulation::SimulationProfile;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default file looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/rate-compare";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RATE_COMPARE";

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A source could not be read or deserialized.
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are inconsistent.
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Upper bound on one comparison, enforced by the REST layer.
    pub compare_timeout_ms: u64,
}

impl ServerSettings {
    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the comparison timeout.
    #[must_use]
    pub fn compare_timeout(&self) -> Duration {
        Duration::from_millis(self.compare_timeout_ms)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

/// Settings for one provider and its simulated upstream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderSettings {
    /// Whether the aggregator queries this provider.
    pub enabled: bool,
    /// Adapter timeout.
    pub timeout_ms: u64,
    /// Remote upstream URL; the in-process simulator is used when absent.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Simulated latency lower bound.
    pub latency_min_ms: u64,
    /// Simulated latency upper bound.
    pub latency_max_ms: u64,
    /// Rate jitter half-width, e.g. `0.02` for ±2%.
    pub jitter: f64,
    /// Probability of a simulated transient failure.
    pub failure_probability: f64,
}

impl ProviderSettings {
    /// Returns the upstream simulation profile.
    #[must_use]
    pub fn profile(&self) -> SimulationProfile {
        SimulationProfile::new(
            self.latency_min_ms,
            self.latency_max_ms,
            self.jitter,
            self.failure_probability,
        )
    }

    fn validate(&self, name: &str) -> Result<(), SettingsError> {
        if self.timeout_ms == 0 {
            return Err(SettingsError::Invalid(format!(
                "providers.{name}.timeout_ms cannot be 0"
            )));
        }
        if self.latency_min_ms > self.latency_max_ms {
            return Err(SettingsError::Invalid(format!(
                "providers.{name}.latency_min_ms cannot exceed latency_max_ms"
            )));
        }
        if !(0.0..0.5).contains(&self.jitter) {
            return Err(SettingsError::Invalid(format!(
                "providers.{name}.jitter must be in [0, 0.5)"
            )));
        }
        if !(0.0..=1.0).contains(&self.failure_probability) {
            return Err(SettingsError::Invalid(format!(
                "providers.{name}.failure_probability must be in [0, 1]"
            )));
        }
        if let Some(endpoint) = &self.endpoint
            && endpoint.trim().is_empty()
        {
            return Err(SettingsError::Invalid(format!(
                "providers.{name}.endpoint cannot be blank"
            )));
        }
        Ok(())
    }
}

/// Settings for the three bundled providers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProvidersSettings {
    /// Flat JSON provider.
    pub api1: ProviderSettings,
    /// XML provider.
    pub api2: ProviderSettings,
    /// Nested JSON provider.
    pub api3: ProviderSettings,
}

impl ProvidersSettings {
    /// Returns `(name, settings)` pairs in query order.
    #[must_use]
    pub fn entries(&self) -> [(&'static str, &ProviderSettings); 3] {
        [
            ("API1", &self.api1),
            ("API2", &self.api2),
            ("API3", &self.api3),
        ]
    }
}

/// Service settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// HTTP server.
    pub server: ServerSettings,
    /// Logging.
    pub logging: LoggingSettings,
    /// Providers.
    pub providers: ProvidersSettings,
}

impl Settings {
    /// Loads settings from defaults, the default file and the environment.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` if a source is malformed.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(Some(DEFAULT_CONFIG_FILE))
    }

    /// Loads settings, optionally reading a file source.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` if a source is malformed.
    pub fn load_from(file: Option<&str>) -> Result<Self, SettingsError> {
        let mut builder = Self::defaults()?;
        if let Some(file) = file {
            builder = builder.add_source(File::with_name(file).required(false));
        }
        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Returns the built-in defaults without reading any file or variable.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` only if the defaults fail to deserialize.
    pub fn default_values() -> Result<Self, SettingsError> {
        Ok(Self::defaults()?.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000_i64)?
            .set_default("server.compare_timeout_ms", 15_000_i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "text")?;

        let profiles: [(&str, i64, i64, f64, f64); 3] = [
            ("api1", 100, 300, 0.02, 0.0),
            ("api2", 200, 400, 0.015, 0.0),
            ("api3", 150, 350, 0.025, 0.1),
        ];
        profiles.into_iter().try_fold(
            builder,
            |builder, (name, latency_min, latency_max, jitter, failure)| {
                let key = |field: &str| format!("providers.{name}.{field}");
                Ok(builder
                    .set_default(key("enabled"), true)?
                    .set_default(key("timeout_ms"), 10_000_i64)?
                    .set_default(key("latency_min_ms"), latency_min)?
                    .set_default(key("latency_max_ms"), latency_max)?
                    .set_default(key("jitter"), jitter)?
                    .set_default(key("failure_probability"), failure)?)
            },
        )
    }

    /// Checks cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::Invalid("server.port cannot be 0".to_string()));
        }
        if self.server.compare_timeout_ms == 0 {
            return Err(SettingsError::Invalid(
                "server.compare_timeout_ms cannot be 0".to_string(),
            ));
        }
        for (name, provider) in self.providers.entries() {
            provider.validate(&name.to_ascii_lowercase())?;
        }
        if !self
            .providers
            .entries()
            .iter()
            .any(|(_, provider)| provider.enabled)
        {
            return Err(SettingsError::Invalid(
                "at least one provider must be enabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::default_values().unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        let settings = settings();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(settings.server.compare_timeout(), Duration::from_secs(15));
        assert_eq!(settings.logging.format, LogFormat::Text);
        assert_eq!(settings.providers.api1.timeout_ms, 10_000);
        assert!(settings.providers.api2.endpoint.is_none());
    }

    #[test]
    fn defaults_carry_per_provider_profiles() {
        let settings = settings();
        let api3 = settings.providers.api3.profile();
        assert_eq!(api3.latency_min_ms(), 150);
        assert_eq!(api3.latency_max_ms(), 350);
        assert!((api3.failure_probability() - 0.1).abs() < f64::EPSILON);
        assert!((settings.providers.api2.jitter - 0.015).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_zero_port() {
        let mut settings = settings();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_inverted_latency_bounds() {
        let mut settings = settings();
        settings.providers.api2.latency_min_ms = 500;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("providers.api2.latency_min_ms"));
    }

    #[test]
    fn rejects_out_of_range_probability_and_jitter() {
        let mut unlikely = settings();
        unlikely.providers.api3.failure_probability = 1.5;
        assert!(unlikely.validate().is_err());

        let mut jittery = settings();
        jittery.providers.api1.jitter = 0.5;
        assert!(jittery.validate().is_err());
    }

    #[test]
    fn rejects_all_providers_disabled() {
        let mut settings = settings();
        settings.providers.api1.enabled = false;
        settings.providers.api2.enabled = false;
        settings.providers.api3.enabled = false;
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("at least one provider"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut settings = settings();
        settings.providers.api1.timeout_ms = 0;
        assert!(settings.validate().is_err());
    }
}
