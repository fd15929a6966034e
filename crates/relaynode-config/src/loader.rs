//! Configuration file loading and error types.

use std::{fs, io, path::Path};

use relaynode_core::defaults::DEFAULT_CONFIG_PATH;
use tracing::debug;

use crate::Config;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config format")]
    UnsupportedFormat,
    #[error("validation: {0}")]
    Validation(String),
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
        "json" | "jsonc" => {
            let stripped = json_comments::StripComments::new(data.as_bytes());
            Ok(serde_json::from_reader(stripped)?)
        }
        "yaml" | "yml" => Ok(serde_yaml::from_str(&data)?),
        "toml" => Ok(toml::from_str(&data)?),
        _ => Err(ConfigError::UnsupportedFormat),
    }
}

/// Load `path`, or the default path when none was given.
///
/// Only the default path may be absent; it then yields built-in defaults.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => match load_config(DEFAULT_CONFIG_PATH) {
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
                Ok(Config::default())
            }
            other => other,
        },
    }
}
