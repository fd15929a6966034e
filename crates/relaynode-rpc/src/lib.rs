//! Control-plane gRPC service for relay nodes.
//!
//! A controller manages the node's users and collects per-user traffic
//! through the `server.Server` service:
//!
//! - `AddUser` / `UpdateUser` / `DeleteUser`: single-user mutations
//! - `SyncUser`: reconcile the registry against a full user list
//! - `TrafficStats`: server-streamed ledger snapshots at a requested interval
//!
//! # Usage
//!
//! ```bash
//! relaynode-rpc -c relaynode.toml --listen 127.0.0.1:9887
//! ```

pub mod cli;
mod convert;
pub mod error;
pub mod reporter;
pub mod server;
pub mod service;
pub mod state;

/// Generated wire types and tonic client/server stubs.
pub mod proto {
    tonic::include_proto!("server");
}

pub use cli::RpcArgs;
pub use error::RpcError;
pub use reporter::{LivenessGuard, StreamEnd, StreamLiveness, run_reporter};
pub use server::{run_with_shutdown, serve_with_listener};
pub use service::NodeService;
pub use state::{CommandReply, NodeCommand, NodeState, StatsPolicy};
pub use tokio_util::sync::CancellationToken;
