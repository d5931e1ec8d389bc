//! # Telemetry
//!
//! Global `tracing` subscriber setup.

use crate::config::{LogFormat, LoggingSettings};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Builds the filter: `RUST_LOG` when set and valid, else the configured
/// level, else `info`.
#[must_use]
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(settings));

    match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init(),
    }
}
