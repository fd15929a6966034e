//! Configuration validation logic.

use std::net::SocketAddr;

use relaynode_core::defaults::{STALE_CREDENTIALS_EVICT, STALE_CREDENTIALS_RETAIN};

use crate::Config;
use crate::loader::ConfigError;

const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];
const LOG_OUTPUTS: [&str; 2] = ["stderr", "stdout"];

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.listen.trim().parse::<SocketAddr>().is_err() {
        return Err(ConfigError::Validation(format!(
            "server.listen is not a socket address: {:?}",
            config.server.listen
        )));
    }
    if config.server.keepalive_interval_secs > 0 && config.server.keepalive_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "server.keepalive_timeout_secs must be > 0 when keepalive is enabled".into(),
        ));
    }
    let policy = config.registry.stale_credentials.trim().to_ascii_lowercase();
    if policy != STALE_CREDENTIALS_RETAIN && policy != STALE_CREDENTIALS_EVICT {
        return Err(ConfigError::Validation(format!(
            "registry.stale_credentials must be '{STALE_CREDENTIALS_RETAIN}' or '{STALE_CREDENTIALS_EVICT}'"
        )));
    }
    if config.stats.min_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "stats.min_interval_ms must be > 0".into(),
        ));
    }
    if config.stats.channel_capacity == 0 {
        return Err(ConfigError::Validation(
            "stats.channel_capacity must be > 0".into(),
        ));
    }
    if let Some(listen) = &config.metrics.listen
        && listen.trim().parse::<SocketAddr>().is_err()
    {
        return Err(ConfigError::Validation(format!(
            "metrics.listen is not a socket address: {listen:?}"
        )));
    }
    if let Some(format) = &config.logging.format
        && !LOG_FORMATS.contains(&format.as_str())
    {
        return Err(ConfigError::Validation(format!(
            "logging.format must be one of: {:?}",
            LOG_FORMATS
        )));
    }
    if let Some(output) = &config.logging.output
        && !LOG_OUTPUTS.contains(&output.as_str())
    {
        return Err(ConfigError::Validation(format!(
            "logging.output must be one of: {:?}",
            LOG_OUTPUTS
        )));
    }
    Ok(())
}
