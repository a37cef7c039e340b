use std::path::Path;

use serde::{Deserialize, Serialize};

use datamold_generate::GenerationSettings;

use super::ConfigResult;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "datamold.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub generation: GenerationSettings,
    pub logging: LoggingSettings,
}

/// Load `explicit`, or `datamold.toml` if it exists, or the defaults.
pub fn load_config(explicit: Option<&Path>) -> ConfigResult<CliConfig> {
    let path = match explicit {
        Some(path) => path,
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(CliConfig::default());
            }
            fallback
        }
    };
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> ConfigResult<CliConfig> {
    let config: CliConfig = toml::from_str(content)?;
    Ok(config)
}
