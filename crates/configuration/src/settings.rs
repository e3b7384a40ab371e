use crate::error::ConfigError;
use core_types::ViewMode;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub statistics: StatisticsSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects values that deserialize fine but cannot work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must not be 0".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection pool settings. The URL itself comes from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    /// How long to wait for a free connection before giving up.
    pub acquire_timeout_secs: u64,
    /// Apply pending migrations on startup.
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
            run_migrations: true,
        }
    }
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes.
    pub body_limit_bytes: usize,
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StatisticsSettings {
    /// Unit used when a request does not name one.
    pub default_view_mode: ViewMode,
}

/// Line layout of the `tracing-subscriber` formatter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One line per event with all fields.
    #[default]
    Full,
    /// One shortened line per event.
    Compact,
    /// Multi-line, human-oriented output.
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive, e.g. `"info"` or `"tradelog=debug,sqlx=warn"`.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs go to a daily rolling file in this directory instead of stdout.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            directory: None,
            file_prefix: "tradelog.log".to_string(),
        }
    }
}
