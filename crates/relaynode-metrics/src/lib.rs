//! Metrics collection and Prometheus exporter for relaynode.
//!
//! Covers the user registry (size, mutations, syncs), the traffic stats
//! stream and data-plane traffic. Recording is a no-op until
//! [`init_prometheus`] installs a recorder.

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Initialize Prometheus metrics exporter.
///
/// Starts an HTTP server on the given address to expose metrics.
/// Returns an error message if binding fails.
pub fn init_prometheus(listen: &str) -> Result<(), String> {
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| format!("invalid metrics listen address: {}", e))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("failed to install prometheus exporter: {}", e))?;

    Ok(())
}

// ============================================================================
// Metric Names
// ============================================================================

/// Number of credentials currently registered.
pub const USERS_REGISTERED: &str = "relaynode_users_registered";
/// Single-user mutations by operation (add, update, delete).
pub const USER_MUTATIONS_TOTAL: &str = "relaynode_user_mutations_total";
/// Full user list syncs applied.
pub const SYNC_TOTAL: &str = "relaynode_sync_total";
/// Credentials added by syncs.
pub const SYNC_USERS_ADDED_TOTAL: &str = "relaynode_sync_users_added_total";
/// Credentials removed by syncs.
pub const SYNC_USERS_REMOVED_TOTAL: &str = "relaynode_sync_users_removed_total";
/// 1 while a traffic stats stream is attached, else 0.
pub const STATS_STREAM_ATTACHED: &str = "relaynode_stats_stream_attached";
/// Traffic snapshots delivered to the controller.
pub const STATS_SNAPSHOTS_TOTAL: &str = "relaynode_stats_snapshots_total";
/// Records per delivered snapshot.
pub const STATS_SNAPSHOT_ENTRIES: &str = "relaynode_stats_snapshot_entries";
/// Bytes reported by the data plane.
pub const TRAFFIC_BYTES_TOTAL: &str = "relaynode_traffic_bytes_total";
/// Total number of errors by type.
pub const ERRORS_TOTAL: &str = "relaynode_errors_total";

/// Operation label values for [`USER_MUTATIONS_TOTAL`].
pub const OP_ADD: &str = "add";
pub const OP_UPDATE: &str = "update";
pub const OP_DELETE: &str = "delete";

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a single-user mutation and the resulting registry size.
#[inline]
pub fn record_user_mutation(op: &'static str, registered: usize) {
    counter!(USER_MUTATIONS_TOTAL, "op" => op).increment(1);
    set_users_registered(registered);
}

/// Record an applied user list sync.
#[inline]
pub fn record_sync(added: usize, removed: usize, registered: usize) {
    counter!(SYNC_TOTAL).increment(1);
    counter!(SYNC_USERS_ADDED_TOTAL).increment(added as u64);
    counter!(SYNC_USERS_REMOVED_TOTAL).increment(removed as u64);
    set_users_registered(registered);
}

/// Set registered credential count.
#[inline]
pub fn set_users_registered(registered: usize) {
    gauge!(USERS_REGISTERED).set(registered as f64);
}

/// Mark the traffic stats stream attached or detached.
#[inline]
pub fn set_stats_stream_attached(attached: bool) {
    gauge!(STATS_STREAM_ATTACHED).set(if attached { 1.0 } else { 0.0 });
}

/// Record a snapshot delivered to the stream.
#[inline]
pub fn record_stats_snapshot(entries: usize) {
    counter!(STATS_SNAPSHOTS_TOTAL).increment(1);
    histogram!(STATS_SNAPSHOT_ENTRIES).record(entries as f64);
}

/// Record bytes accounted to a user.
#[inline]
pub fn record_traffic_bytes(bytes: u64) {
    counter!(TRAFFIC_BYTES_TOTAL).increment(bytes);
}

/// Record an error by type.
#[inline]
pub fn record_error(error_type: &'static str) {
    counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
}

// ============================================================================
// Error Type Constants (re-exported from relaynode-core)
// ============================================================================

pub use relaynode_core::{
    ERROR_AUTH, ERROR_CONFIG, ERROR_IO, ERROR_METRICS, ERROR_STREAM_SEND, ERROR_TRANSPORT,
};
