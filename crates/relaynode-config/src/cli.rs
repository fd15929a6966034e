//! CLI override definitions and application logic.

use clap::Parser;

use crate::Config;

#[derive(Debug, Clone, Parser, Default)]
pub struct CliOverrides {
    /// Override gRPC listen address, e.g. 0.0.0.0:9887
    #[arg(long)]
    pub listen: Option<String>,
    /// Override log level (trace/debug/info/warn/error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Override metrics listen address
    #[arg(long)]
    pub metrics_listen: Option<String>,
    /// Override the smallest traffic stats interval (milliseconds)
    #[arg(long)]
    pub min_stats_interval_ms: Option<u64>,
    /// Stale credential policy for user sync (retain, evict)
    #[arg(long)]
    pub stale_credentials: Option<String>,
    /// Override shutdown grace period (seconds)
    #[arg(long)]
    pub shutdown_grace_secs: Option<u64>,
}

pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = &overrides.listen {
        config.server.listen = v.clone();
    }
    if let Some(v) = &overrides.log_level {
        config.logging.level = Some(v.clone());
    }
    if let Some(v) = &overrides.metrics_listen {
        config.metrics.listen = Some(v.clone());
    }
    if let Some(v) = overrides.min_stats_interval_ms {
        config.stats.min_interval_ms = v;
    }
    if let Some(v) = &overrides.stale_credentials {
        config.registry.stale_credentials = v.clone();
    }
    if let Some(v) = overrides.shutdown_grace_secs {
        config.server.shutdown_grace_secs = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_loaded_values() {
        let overrides = CliOverrides::parse_from([
            "relaynode",
            "--listen",
            "0.0.0.0:7000",
            "--log-level",
            "debug",
            "--stale-credentials",
            "evict",
            "--min-stats-interval-ms",
            "500",
        ]);
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, &overrides);

        assert_eq!(cfg.server.listen, "0.0.0.0:7000");
        assert_eq!(cfg.logging.level.as_deref(), Some("debug"));
        assert_eq!(cfg.registry.stale_credentials, "evict");
        assert_eq!(cfg.stats.min_interval_ms, 500);
        assert!(cfg.metrics.listen.is_none());
        assert_eq!(cfg.server.shutdown_grace_secs, 10);
    }

    #[test]
    fn no_overrides_is_identity() {
        let mut cfg = Config::default();
        cfg.server.listen = "127.0.0.1:1".into();
        apply_overrides(&mut cfg, &CliOverrides::default());
        assert_eq!(cfg.server.listen, "127.0.0.1:1");
    }
}
