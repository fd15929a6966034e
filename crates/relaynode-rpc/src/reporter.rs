//! Traffic stats streaming.
//!
//! One reporter task runs per attached `TrafficStats` stream. It snapshots
//! the ledger, pushes the snapshot into the stream's channel and sleeps for
//! the stream's interval, until the server shuts down or the client goes
//! away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use relaynode_auth::TrafficLedger;
use relaynode_metrics::{
    ERROR_STREAM_SEND, record_error, record_stats_snapshot, set_stats_stream_attached,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::{debug, info, warn};

use crate::proto::UserList;

/// Process-wide "a stats consumer is attached" flag.
///
/// Only one consumer is expected. If a second stream attaches, the flag is
/// shared and whichever stream ends first clears it.
#[derive(Debug, Clone, Default)]
pub struct StreamLiveness {
    attached: Arc<AtomicBool>,
}

impl StreamLiveness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a stream is currently attached.
    #[inline]
    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    /// Mark a stream attached until the returned guard is dropped.
    pub fn attach(&self) -> LivenessGuard {
        if self.attached.swap(true, Ordering::AcqRel) {
            warn!("traffic stats stream attached while another is active");
        }
        set_stats_stream_attached(true);
        LivenessGuard {
            attached: self.attached.clone(),
        }
    }
}

/// Clears the liveness flag on drop.
#[derive(Debug)]
pub struct LivenessGuard {
    attached: Arc<AtomicBool>,
}

impl Drop for LivenessGuard {
    fn drop(&mut self) {
        self.attached.store(false, Ordering::Release);
        set_stats_stream_attached(false);
    }
}

/// Why a reporter stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server is shutting down.
    Shutdown,
    /// The client cancelled the call or the connection broke.
    Disconnected,
}

/// Stream ledger snapshots into `tx` every `interval`.
///
/// Holds `guard` for the whole run so the liveness flag is cleared on every
/// exit path.
pub async fn run_reporter(
    ledger: TrafficLedger,
    interval: Duration,
    tx: mpsc::Sender<Result<UserList, Status>>,
    shutdown: CancellationToken,
    guard: LivenessGuard,
) -> StreamEnd {
    let _guard = guard;
    info!(interval_ms = interval.as_millis() as u64, "traffic stats stream attached");

    let end = loop {
        if shutdown.is_cancelled() {
            break StreamEnd::Shutdown;
        }
        if tx.is_closed() {
            break StreamEnd::Disconnected;
        }

        let list: UserList = ledger.snapshot().into_iter().collect();
        let entries = list.user_list.len();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break StreamEnd::Shutdown,

            sent = tx.send(Ok(list)) => {
                if sent.is_err() {
                    record_error(ERROR_STREAM_SEND);
                    warn!(entries, "failed to deliver traffic snapshot, stream closed");
                    break StreamEnd::Disconnected;
                }
                record_stats_snapshot(entries);
                debug!(entries, "traffic snapshot sent");
            }
        }

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break StreamEnd::Shutdown,
            _ = tx.closed() => break StreamEnd::Disconnected,
            _ = tokio::time::sleep(interval) => {}
        }
    };

    info!(reason = ?end, "traffic stats stream detached");
    end
}
