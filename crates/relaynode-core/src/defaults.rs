//! Default configuration values.
//!
//! Centralized default constants for use across all crates.

// ============================================================================
// Listener Defaults
// ============================================================================

/// Default gRPC listen address for the controller connection.
pub const DEFAULT_LISTEN: &str = "127.0.0.1:9887";
/// Default config file path used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "relaynode.toml";

// ============================================================================
// Keepalive Defaults
// ============================================================================

/// Default HTTP/2 keepalive ping interval in seconds (ping an idle client).
pub const DEFAULT_KEEPALIVE_INTERVAL_SECS: u64 = 20;
/// Default HTTP/2 keepalive ack timeout in seconds.
pub const DEFAULT_KEEPALIVE_TIMEOUT_SECS: u64 = 5;
/// Default TCP keepalive in seconds (0 = disabled).
pub const DEFAULT_TCP_KEEPALIVE_SECS: u64 = 20;
/// Default grace period for in-flight calls on shutdown, in seconds.
pub const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 10;

// ============================================================================
// Registry Defaults
// ============================================================================

/// Keep old credentials of a user whose password changed (reference behavior).
pub const STALE_CREDENTIALS_RETAIN: &str = "retain";
/// Drop credentials that are absent from a pushed user list.
pub const STALE_CREDENTIALS_EVICT: &str = "evict";
/// Default stale-credential policy for user list sync.
pub const DEFAULT_STALE_CREDENTIALS: &str = STALE_CREDENTIALS_RETAIN;

// ============================================================================
// Traffic Stats Defaults
// ============================================================================

/// Floor applied to the client-requested snapshot interval, in milliseconds.
pub const DEFAULT_MIN_STATS_INTERVAL_MS: u64 = 100;
/// Snapshots buffered per stream before the reporter waits on the client.
pub const DEFAULT_STATS_CHANNEL_CAPACITY: usize = 4;

// ============================================================================
// Logging Defaults
// ============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Default log format (pretty, compact, json).
pub const DEFAULT_LOG_FORMAT: &str = "pretty";
/// Default log output (stderr, stdout).
pub const DEFAULT_LOG_OUTPUT: &str = "stderr";
