//! Node state and command dispatch.
//!
//! Every controller call is decoded into a [`NodeCommand`] and handled by
//! [`NodeState::handle`]; the gRPC layer only translates messages.

use std::time::Duration;

use async_trait::async_trait;
use relaynode_auth::{
    AuthBackend, AuthError, AuthResult, StaleCredentialPolicy, SyncReport, UserRecord,
    UserRegistry,
};
use relaynode_config::Config;
use relaynode_core::defaults;
use relaynode_metrics::{
    ERROR_AUTH, OP_ADD, OP_DELETE, OP_UPDATE, record_error, record_sync, record_traffic_bytes,
    record_user_mutation,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::{debug, info};

use crate::error::RpcError;
use crate::proto::UserList;
use crate::reporter::{StreamLiveness, run_reporter};

/// Limits applied to traffic stats streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsPolicy {
    /// Floor for the client-requested interval.
    pub min_interval: Duration,
    /// Snapshots buffered per stream.
    pub channel_capacity: usize,
}

impl Default for StatsPolicy {
    fn default() -> Self {
        Self {
            min_interval: Duration::from_millis(defaults::DEFAULT_MIN_STATS_INTERVAL_MS),
            channel_capacity: defaults::DEFAULT_STATS_CHANNEL_CAPACITY,
        }
    }
}

impl StatsPolicy {
    /// Interval actually used for a requested one. Negative counts as zero.
    pub fn effective_interval(&self, requested_ms: i64) -> Duration {
        let requested = Duration::from_millis(u64::try_from(requested_ms).unwrap_or(0));
        requested.max(self.min_interval)
    }
}

/// A decoded controller request.
#[derive(Debug, Clone)]
pub enum NodeCommand {
    AddUser(UserRecord),
    UpdateUser(UserRecord),
    DeleteUser(UserRecord),
    SyncUsers(Vec<UserRecord>),
    TrafficStats { interval_ms: i64 },
}

/// Outcome of a [`NodeCommand`].
#[derive(Debug)]
pub enum CommandReply {
    /// A single-user mutation was applied.
    Done,
    /// A full user list was reconciled.
    Synced(SyncReport),
    /// A stats stream was started; snapshots arrive on the receiver.
    Stream(mpsc::Receiver<Result<UserList, Status>>),
}

/// Shared state behind the control-plane service.
///
/// Cheap to clone. The same value serves the data plane through its
/// [`AuthBackend`] impl.
#[derive(Debug, Clone)]
pub struct NodeState {
    registry: UserRegistry,
    liveness: StreamLiveness,
    stats: StatsPolicy,
    stale_credentials: StaleCredentialPolicy,
    shutdown: CancellationToken,
}

impl NodeState {
    pub fn new(registry: UserRegistry) -> Self {
        Self {
            registry,
            liveness: StreamLiveness::new(),
            stats: StatsPolicy::default(),
            stale_credentials: StaleCredentialPolicy::default(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Build state with the registry and stats settings from `config`.
    pub fn from_config(config: &Config, registry: UserRegistry) -> Result<Self, RpcError> {
        let stale_credentials = config
            .registry
            .stale_credentials
            .parse()
            .map_err(|e| RpcError::Config(format!("{e}")))?;
        Ok(Self::new(registry)
            .with_stale_credentials(stale_credentials)
            .with_stats_policy(StatsPolicy {
                min_interval: Duration::from_millis(config.stats.min_interval_ms),
                channel_capacity: config.stats.channel_capacity,
            }))
    }

    pub fn with_stats_policy(mut self, stats: StatsPolicy) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_stale_credentials(mut self, policy: StaleCredentialPolicy) -> Self {
        self.stale_credentials = policy;
        self
    }

    /// Stats streams end when `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    #[inline]
    pub fn registry(&self) -> &UserRegistry {
        &self.registry
    }

    #[inline]
    pub fn liveness(&self) -> &StreamLiveness {
        &self.liveness
    }

    #[inline]
    pub fn stats_policy(&self) -> StatsPolicy {
        self.stats
    }

    /// Apply one controller command.
    ///
    /// `TrafficStats` spawns a reporter task and must be called from within
    /// a tokio runtime.
    pub fn handle(&self, command: NodeCommand) -> CommandReply {
        match command {
            NodeCommand::AddUser(user) => {
                debug!(username = %user.username, "add user");
                self.registry.add(user);
                record_user_mutation(OP_ADD, self.registry.len());
                CommandReply::Done
            }
            NodeCommand::UpdateUser(user) => {
                debug!(username = %user.username, "update user");
                self.registry.update(user);
                record_user_mutation(OP_UPDATE, self.registry.len());
                CommandReply::Done
            }
            NodeCommand::DeleteUser(user) => {
                let removed = self.registry.delete(&user);
                debug!(username = %user.username, removed, "delete user");
                record_user_mutation(OP_DELETE, self.registry.len());
                CommandReply::Done
            }
            NodeCommand::SyncUsers(users) => {
                let report = self.registry.sync(&users, self.stale_credentials);
                record_sync(report.added, report.removed, self.registry.len());
                CommandReply::Synced(report)
            }
            NodeCommand::TrafficStats { interval_ms } => {
                let interval = self.stats.effective_interval(interval_ms);
                if interval.as_millis() != u128::try_from(interval_ms).unwrap_or(0) {
                    info!(
                        requested_ms = interval_ms,
                        interval_ms = interval.as_millis() as u64,
                        "traffic stats interval raised to floor"
                    );
                }
                let (tx, rx) = mpsc::channel(self.stats.channel_capacity);
                let guard = self.liveness.attach();
                tokio::spawn(run_reporter(
                    self.registry.ledger().clone(),
                    interval,
                    tx,
                    self.shutdown.clone(),
                    guard,
                ));
                CommandReply::Stream(rx)
            }
        }
    }
}

#[async_trait]
impl AuthBackend for NodeState {
    async fn verify(&self, credential: &str) -> Result<AuthResult, AuthError> {
        let result = self.registry.verify(credential).await;
        if result.is_err() {
            record_error(ERROR_AUTH);
        }
        result
    }

    async fn record_traffic(&self, username: &str, bytes: u64, peer: &str) -> Result<(), AuthError> {
        match self.registry.record_traffic(username, bytes, peer).await {
            Ok(()) => {
                record_traffic_bytes(bytes);
                Ok(())
            }
            Err(e) => {
                record_error(ERROR_AUTH);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relaynode_auth::{TrafficLedger, encode_credentials};

    fn state() -> NodeState {
        NodeState::new(UserRegistry::new(TrafficLedger::new()))
    }

    #[test]
    fn effective_interval_clamps() {
        let policy = StatsPolicy {
            min_interval: Duration::from_millis(100),
            channel_capacity: 1,
        };
        assert_eq!(policy.effective_interval(0), Duration::from_millis(100));
        assert_eq!(policy.effective_interval(-5), Duration::from_millis(100));
        assert_eq!(policy.effective_interval(99), Duration::from_millis(100));
        assert_eq!(policy.effective_interval(1500), Duration::from_millis(1500));
    }

    #[test]
    fn mutations_dispatch_to_registry() {
        let state = state();
        state.handle(NodeCommand::AddUser(UserRecord::new("alice", "p1")));
        state.handle(NodeCommand::UpdateUser(
            UserRecord::new("alice", "p1").with_policy("tier", "gold"),
        ));
        let user = state
            .registry()
            .lookup(&encode_credentials("alice", "p1"))
            .unwrap();
        assert_eq!(user.policy.get("tier").map(String::as_str), Some("gold"));

        state.handle(NodeCommand::DeleteUser(UserRecord::new("alice", "p1")));
        assert!(state.registry().is_empty());
        assert!(state.registry().ledger().contains("alice"));
    }

    #[test]
    fn sync_uses_configured_policy() {
        let state = state().with_stale_credentials(StaleCredentialPolicy::Evict);
        state.handle(NodeCommand::AddUser(UserRecord::new("alice", "old")));

        let reply = state.handle(NodeCommand::SyncUsers(vec![UserRecord::new("alice", "new")]));
        match reply {
            CommandReply::Synced(report) => assert_eq!(report, SyncReport { added: 1, removed: 1 }),
            other => panic!("unexpected reply {other:?}"),
        }
        assert!(!state.registry().contains(&encode_credentials("alice", "old")));
    }

    #[test]
    fn from_config_rejects_unknown_policy() {
        let mut config = Config::default();
        config.registry.stale_credentials = "sometimes".into();
        let err = NodeState::from_config(&config, UserRegistry::new(TrafficLedger::new()));
        assert!(matches!(err, Err(RpcError::Config(_))));

        config.registry.stale_credentials = "evict".into();
        config.stats.min_interval_ms = 250;
        let state = NodeState::from_config(&config, UserRegistry::new(TrafficLedger::new())).unwrap();
        assert_eq!(state.stats_policy().min_interval, Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn traffic_stats_streams_until_shutdown() {
        let shutdown = CancellationToken::new();
        let state = state().with_shutdown(shutdown.clone());
        state.handle(NodeCommand::AddUser(UserRecord::new("bob", "p1")));

        let CommandReply::Stream(mut rx) = state.handle(NodeCommand::TrafficStats { interval_ms: 0 })
        else {
            panic!("expected a stream");
        };
        assert!(state.liveness().is_attached());

        let list = rx.recv().await.unwrap().unwrap();
        assert_eq!(list.user_list.len(), 1);
        assert_eq!(list.user_list[0].username, "bob");

        shutdown.cancel();
        // Channel closes once the reporter exits.
        while rx.recv().await.is_some() {}
        assert!(!state.liveness().is_attached());
    }

    #[tokio::test]
    async fn auth_backend_reads_registry() {
        let state = state();
        state.handle(NodeCommand::AddUser(UserRecord::new("carol", "p1")));

        let result = state.verify(&encode_credentials("carol", "p1")).await.unwrap();
        assert_eq!(result.username(), "carol");
        state.record_traffic("carol", 42, "192.0.2.8").await.unwrap();
        assert_eq!(state.registry().ledger().get("carol").unwrap().traffic, 42);
        assert!(state.verify(&encode_credentials("carol", "bad")).await.is_err());
    }
}
