//! RPC server error types.

use relaynode_metrics::{ERROR_CONFIG, ERROR_IO, ERROR_METRICS, ERROR_TRANSPORT};

/// RPC server error type.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport: {0}")]
    Transport(#[from] tonic::transport::Error),
    #[error("config: {0}")]
    Config(String),
    #[error("metrics: {0}")]
    Metrics(String),
}

impl RpcError {
    /// Get the error type string for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            RpcError::Io(_) => ERROR_IO,
            RpcError::Transport(_) => ERROR_TRANSPORT,
            RpcError::Config(_) => ERROR_CONFIG,
            RpcError::Metrics(_) => ERROR_METRICS,
        }
    }
}
