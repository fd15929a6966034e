//! Configuration type definitions for the gRPC server, registry, stats stream, metrics, and logging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Controller-facing gRPC listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. 127.0.0.1:9887.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// HTTP/2 keepalive ping interval in seconds (0 = disabled).
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
    /// Time to wait for a keepalive ack before closing the connection.
    #[serde(default = "default_keepalive_timeout_secs")]
    pub keepalive_timeout_secs: u64,
    /// TCP keepalive in seconds (0 = disabled).
    #[serde(default = "default_tcp_keepalive_secs")]
    pub tcp_keepalive_secs: u64,
    /// How long in-flight calls may run after shutdown starts.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            keepalive_interval_secs: default_keepalive_interval_secs(),
            keepalive_timeout_secs: default_keepalive_timeout_secs(),
            tcp_keepalive_secs: default_tcp_keepalive_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// What a full user sync does with old credentials of listed users:
    /// "retain" keeps them, "evict" removes them.
    #[serde(default = "default_stale_credentials")]
    pub stale_credentials: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            stale_credentials: default_stale_credentials(),
        }
    }
}

/// Traffic stats stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Smallest snapshot interval a client may request, in milliseconds.
    #[serde(default = "default_min_stats_interval_ms")]
    pub min_interval_ms: u64,
    /// Snapshots buffered per stream.
    #[serde(default = "default_stats_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_stats_interval_ms(),
            channel_capacity: default_stats_channel_capacity(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Prometheus exporter address. Disabled when unset.
    pub listen: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Option<String>,
    /// Log format: json, pretty, or compact. Default: pretty.
    pub format: Option<String>,
    /// Output target: stdout or stderr. Default: stderr.
    pub output: Option<String>,
    /// Per-module log level filters (e.g., {"relaynode_auth": "debug", "h2": "warn"}).
    #[serde(default)]
    pub filters: HashMap<String, String>,
}
