//! Configuration for the assignment service

use std::time::Duration;

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::error::{AssignmentError, Result};

/// Environment variable prefix, e.g. `DESK__DATABASE__URL`
pub const ENV_PREFIX: &str = "DESK";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentConfig {
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Data store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL; `sqlite::memory:` for a throwaway database
    pub url: String,

    /// Pool size for file databases. In-memory databases always use a
    /// single connection.
    pub max_connections: u32,

    /// Upper bound on any single store call, including pool acquisition
    pub query_timeout_secs: u64,

    /// How long SQLite waits on a locked database before reporting busy
    pub busy_timeout_secs: u64,
}

/// HTTP boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `assignment_core=debug`
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
    /// Include the event target in each line
    pub with_target: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://contact_center.db?mode=rwc".to_string(),
            max_connections: 5,
            query_timeout_secs: 10,
            busy_timeout_secs: 5,
        }
    }
}

impl DatabaseConfig {
    /// In-memory database configuration, mostly for tests
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }

    /// Whether the URL points at a private in-memory database
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            with_target: true,
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl AssignmentConfig {
    /// Load configuration from defaults overlaid with `DESK__*` environment
    /// variables.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(env_source())
    }

    fn from_environment(environment: Environment) -> Result<Self> {
        let defaults = Config::try_from(&Self::default())
            .map_err(|e| AssignmentError::config(e.to_string()))?;

        let config: Self = Config::builder()
            .add_source(defaults)
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| AssignmentError::config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(AssignmentError::config("database.url cannot be empty"));
        }

        if !self.database.url.starts_with("sqlite:") {
            return Err(AssignmentError::config(format!(
                "unsupported database url: {}",
                self.database.url
            )));
        }

        if self.database.max_connections == 0 {
            return Err(AssignmentError::config("database.max_connections must be greater than 0"));
        }

        if self.database.query_timeout_secs == 0 {
            return Err(AssignmentError::config("database.query_timeout_secs must be greater than 0"));
        }

        if self.api.bind_address.parse::<std::net::SocketAddr>().is_err() {
            return Err(AssignmentError::config(format!(
                "invalid api.bind_address: {}",
                self.api.bind_address
            )));
        }

        if self.logging.level.trim().is_empty() {
            return Err(AssignmentError::config("logging.level cannot be empty"));
        }

        Ok(())
    }
}
