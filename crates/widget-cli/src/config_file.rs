use std::{fs, io, path::Path};

use serde::Deserialize;
use thiserror::Error;
use widget::WidgetConfig;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(flatten)]
    pub widget: WidgetConfig,
}

/// Error type for configuration loading operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads the widget configuration from a TOML file.
///
/// Keys that are missing from the file keep their default values.
pub fn load_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok(config)
}

#[inline]
fn parse_config(s: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(s)?;
    Ok(config)
}
