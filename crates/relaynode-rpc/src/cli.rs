//! CLI module for the relaynode gRPC service.
//!
//! Used by the standalone `relaynode-rpc` binary and by the `serve`
//! subcommand of the unified `relaynode` CLI.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use relaynode_auth::{TrafficLedger, UserRegistry};
use relaynode_config::{
    CliOverrides, Config, LoggingConfig, apply_overrides, load_config_or_default, validate_config,
};
use relaynode_metrics::{ERROR_METRICS, record_error};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::server::run_with_shutdown;
use crate::state::NodeState;

/// relaynode gRPC service CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "relaynode-rpc",
    version,
    about = "Control-plane agent for relay nodes"
)]
pub struct RpcArgs {
    /// Config file path (json/yaml/toml). Defaults to relaynode.toml if present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: CliOverrides,
}

/// Load, override and validate the configuration named by `args`.
pub fn resolve_config(args: &RpcArgs) -> Result<Config, relaynode_config::ConfigError> {
    let mut config = load_config_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args.overrides);
    validate_config(&config)?;
    Ok(config)
}

/// Run the service with the given arguments.
pub async fn run(args: RpcArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&args)?;

    init_tracing(&config.logging);

    info!(
        version = relaynode_core::VERSION,
        listen = %config.server.listen,
        stale_credentials = %config.registry.stale_credentials,
        "relaynode starting"
    );

    if let Some(listen) = &config.metrics.listen {
        match relaynode_metrics::init_prometheus(listen) {
            Ok(()) => info!("metrics exporter listening on {}", listen),
            Err(e) => {
                record_error(ERROR_METRICS);
                warn!("failed to start metrics exporter: {}", e);
            }
        }
    }

    // Set up graceful shutdown on SIGTERM/SIGINT
    let shutdown = CancellationToken::new();
    let shutdown_signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal_handler().await;
        info!("shutdown signal received");
        shutdown_signal.cancel();
    });

    let state = NodeState::from_config(&config, UserRegistry::new(TrafficLedger::new()))?;

    if let Err(e) = run_with_shutdown(config, state, shutdown).await {
        relaynode_metrics::record_error(e.error_type());
        return Err(e.into());
    }
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT).
async fn shutdown_signal_handler() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Build the `EnvFilter` directive string from the logging section.
fn filter_directives(config: &LoggingConfig) -> String {
    let base_level = config
        .level
        .as_deref()
        .unwrap_or(relaynode_core::DEFAULT_LOG_LEVEL);
    let mut filter_str = base_level.to_string();

    let mut filters: Vec<_> = config.filters.iter().collect();
    filters.sort();
    for (module, level) in filters {
        filter_str.push(',');
        filter_str.push_str(module);
        filter_str.push('=');
        filter_str.push_str(level);
    }
    filter_str
}

/// Initialize tracing subscriber with the given logging configuration.
///
/// Supports:
/// - `level`: Base log level (trace, debug, info, warn, error)
/// - `format`: Output format (json, pretty, compact). Default: pretty
/// - `output`: Output target (stdout, stderr). Default: stderr
/// - `filters`: Per-module log level overrides
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(filter_directives(config))
        .unwrap_or_else(|_| EnvFilter::new(relaynode_core::DEFAULT_LOG_LEVEL));

    let format = config
        .format
        .as_deref()
        .unwrap_or(relaynode_core::DEFAULT_LOG_FORMAT);
    let output = config
        .output
        .as_deref()
        .unwrap_or(relaynode_core::DEFAULT_LOG_OUTPUT);

    match (format, output) {
        ("json", "stdout") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(io::stdout))
                .init();
        }
        ("json", _) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(io::stderr))
                .init();
        }
        ("compact", "stdout") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_writer(io::stdout))
                .init();
        }
        ("compact", _) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
        (_, "stdout") => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stdout))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(io::stderr))
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn directives_include_module_filters() {
        let config = LoggingConfig {
            level: Some("debug".into()),
            filters: HashMap::from([
                ("h2".to_string(), "warn".to_string()),
                ("relaynode_auth".to_string(), "trace".to_string()),
            ]),
            ..Default::default()
        };
        assert_eq!(
            filter_directives(&config),
            "debug,h2=warn,relaynode_auth=trace"
        );
        assert_eq!(filter_directives(&LoggingConfig::default()), "info");
    }

    #[test]
    fn args_parse_with_overrides() {
        let args = RpcArgs::parse_from([
            "relaynode-rpc",
            "--listen",
            "127.0.0.1:0",
            "--stale-credentials",
            "evict",
        ]);
        assert!(args.config.is_none());
        assert_eq!(args.overrides.listen.as_deref(), Some("127.0.0.1:0"));
    }

    #[test]
    fn resolve_config_validates_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node.toml");
        std::fs::write(&path, "[stats]\nmin_interval_ms = 500\n").unwrap();

        let args = RpcArgs::parse_from([
            "relaynode-rpc",
            "-c",
            path.to_str().unwrap(),
            "--stale-credentials",
            "evict",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.stats.min_interval_ms, 500);
        assert_eq!(config.registry.stale_credentials, "evict");

        let args = RpcArgs::parse_from([
            "relaynode-rpc",
            "-c",
            path.to_str().unwrap(),
            "--listen",
            "bogus",
        ]);
        assert!(resolve_config(&args).is_err());
    }
}
