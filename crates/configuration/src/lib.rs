use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DatabaseSettings, LogFormat, LoggingSettings, ServerSettings, StatisticsSettings,
};

/// Prefix of environment variables that override file settings,
/// e.g. `TRADELOG__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "TRADELOG";

/// Loads the application configuration from `config.toml` in the working directory.
///
/// The file is optional: every setting has a default.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Loads the configuration from `path` (optional) with environment overrides,
/// deserializes it into our strongly-typed `Config` struct and validates it.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

/// Parses configuration from an in-memory TOML document, without environment overrides.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    finish(builder)
}

fn finish(builder: config::Config) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
