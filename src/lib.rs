//! # relaynode
//!
//! Control-plane agent for proxy and relay nodes.
//!
//! ## Crates
//!
//! - [`relaynode_core`] - Shared defaults and error labels
//! - [`relaynode_auth`] - User registry, traffic ledger and reconciliation
//! - [`relaynode_config`] - Configuration loading and validation
//! - [`relaynode_metrics`] - Prometheus-compatible metrics
//! - [`relaynode_rpc`] - gRPC control-plane service

pub use relaynode_auth as auth;
pub use relaynode_config as config;
pub use relaynode_core as core;
pub use relaynode_metrics as metrics;
pub use relaynode_rpc as rpc;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use relaynode_auth::{
        AuthBackend, StaleCredentialPolicy, TrafficLedger, UserRecord, UserRegistry,
        encode_credentials,
    };
    pub use relaynode_config::{Config, load_config, validate_config};
    pub use relaynode_rpc::{CancellationToken, NodeState, RpcError, run_with_shutdown};
}
