//! Logging setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{AssignmentError, Result};

/// Set up the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.level` when present. Installing
/// a second subscriber is not an error, so tests and embedders may call this
/// repeatedly.
pub fn setup_logging(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            AssignmentError::config(format!("Invalid log level '{}': {}", config.level, e))
        })?,
    };

    let builder = fmt().with_env_filter(filter).with_target(config.with_target);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_err() {
        tracing::debug!("Global tracing subscriber already installed, keeping it");
    }

    Ok(())
}

/// Log a welcome message with version info
pub fn log_welcome(app_name: &str, version: &str) {
    tracing::info!("Starting {} v{}", app_name, version);
}
