//! Error type constants for metrics and logging.
//!
//! These constants provide consistent error classification across all crates.

/// I/O error (bind, accept, file access).
pub const ERROR_IO: &str = "io";
/// gRPC transport error.
pub const ERROR_TRANSPORT: &str = "transport";
/// Configuration error.
pub const ERROR_CONFIG: &str = "config";
/// Metrics exporter error.
pub const ERROR_METRICS: &str = "metrics";
/// Data-plane authentication error.
pub const ERROR_AUTH: &str = "auth";
/// Traffic stats stream failed to deliver a snapshot.
pub const ERROR_STREAM_SEND: &str = "stream_send";
