mod logging;
mod settings;

pub use logging::init_logging;
pub use settings::{
    CliConfig, DEFAULT_CONFIG_FILE, LogFormat, LoggingSettings, load_config, parse_config,
};

use thiserror::Error;

/// Errors raised while loading configuration or installing the logger.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("logging error: {0}")]
    Logging(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
