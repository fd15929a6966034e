//! End-to-end tests for the control-plane service.
//!
//! A real tonic client talks to the server over TCP on an ephemeral port:
//! - single-user mutations
//! - full user list sync
//! - traffic stats streaming and liveness tracking
//! - unknown methods
#![allow(clippy::tests_outside_test_module)]

use std::net::SocketAddr;
use std::time::Duration;

use relaynode_auth::{
    AuthBackend, StaleCredentialPolicy, TrafficLedger, UserRegistry, encode_credentials,
};
use relaynode_config::ServerConfig;
use relaynode_rpc::proto::server_client::ServerClient;
use relaynode_rpc::proto::{Empty, Interval, User, UserList};
use relaynode_rpc::{CancellationToken, NodeState, StatsPolicy, serve_with_listener};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;

// ============================================================================
// Test Harness
// ============================================================================

struct TestNode {
    addr: SocketAddr,
    state: NodeState,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<(), relaynode_rpc::RpcError>>,
}

impl TestNode {
    async fn start(state: NodeState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        let config = ServerConfig {
            shutdown_grace_secs: 2,
            ..Default::default()
        };

        let handle = tokio::spawn({
            let state = state.clone();
            let shutdown = shutdown.clone();
            async move { serve_with_listener(listener, &config, state, shutdown).await }
        });

        Self {
            addr,
            state,
            shutdown,
            handle,
        }
    }

    async fn client(&self) -> ServerClient<Channel> {
        for _ in 0..50 {
            if let Ok(client) = ServerClient::connect(format!("http://{}", self.addr)).await {
                return client;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("server at {} never became reachable", self.addr);
    }

    async fn stop(self) {
        self.shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap()
            .unwrap();
    }
}

fn default_state() -> NodeState {
    NodeState::new(UserRegistry::new(TrafficLedger::new()))
}

fn user(username: &str, password: &str) -> User {
    User {
        username: username.into(),
        password: password.into(),
        ..Default::default()
    }
}

async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cond()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn user_mutations_reach_registry() {
    let node = TestNode::start(default_state()).await;
    let mut client = node.client().await;
    let registry = node.state.registry().clone();

    let mut alice = user("alice", "p1");
    alice.policy.insert("speed".into(), "100m".into());
    alice.traffic = 12345;
    client.add_user(alice).await.unwrap();

    let record = registry.lookup(&encode_credentials("alice", "p1")).unwrap();
    assert_eq!(record.policy.get("speed").map(String::as_str), Some("100m"));
    // Traffic fields of a mutation are ignored.
    assert_eq!(registry.ledger().get("alice").unwrap().traffic, 0);

    // Password change through UpdateUser leaves the old credential in place.
    client.update_user(user("alice", "p2")).await.unwrap();
    assert_eq!(registry.len(), 2);

    client.delete_user(user("alice", "p1")).await.unwrap();
    client.delete_user(user("nobody", "x")).await.unwrap();
    assert!(!registry.contains(&encode_credentials("alice", "p1")));
    assert!(registry.contains(&encode_credentials("alice", "p2")));

    node.stop().await;
}

#[tokio::test]
async fn sync_replaces_user_set() {
    let node = TestNode::start(default_state()).await;
    let mut client = node.client().await;
    let registry = node.state.registry().clone();

    client.add_user(user("alice", "p1")).await.unwrap();
    client.add_user(user("bob", "p1")).await.unwrap();

    client
        .sync_user(UserList {
            user_list: vec![user("alice", "p1"), user("carol", "p1")],
        })
        .await
        .unwrap();

    assert_eq!(registry.len(), 2);
    assert!(registry.contains(&encode_credentials("alice", "p1")));
    assert!(registry.contains(&encode_credentials("carol", "p1")));
    assert!(!registry.contains(&encode_credentials("bob", "p1")));
    // bob's accounting survives removal
    assert!(registry.ledger().contains("bob"));

    client.sync_user(UserList::default()).await.unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.ledger().len(), 3);

    node.stop().await;
}

#[tokio::test]
async fn sync_with_evict_policy_drops_old_password() {
    let state = default_state().with_stale_credentials(StaleCredentialPolicy::Evict);
    let node = TestNode::start(state).await;
    let mut client = node.client().await;
    let registry = node.state.registry().clone();

    client
        .sync_user(UserList {
            user_list: vec![user("alice", "old")],
        })
        .await
        .unwrap();
    client
        .sync_user(UserList {
            user_list: vec![user("alice", "new")],
        })
        .await
        .unwrap();

    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&encode_credentials("alice", "new")));

    node.stop().await;
}

#[tokio::test]
async fn unknown_method_is_unimplemented() {
    let node = TestNode::start(default_state()).await;
    drop(node.client().await);

    let channel = Channel::from_shared(format!("http://{}", node.addr))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready().await.unwrap();

    let status = grpc
        .unary(
            tonic::Request::new(Empty {}),
            PathAndQuery::from_static("/server.Server/Bogus"),
            ProstCodec::<Empty, Empty>::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unimplemented);

    // The node keeps serving known methods afterwards.
    let mut client = node.client().await;
    client.add_user(user("alice", "p1")).await.unwrap();
    assert_eq!(node.state.registry().len(), 1);

    node.stop().await;
}

#[tokio::test]
async fn traffic_stats_streams_snapshots() {
    let state = default_state().with_stats_policy(StatsPolicy {
        min_interval: Duration::from_millis(20),
        channel_capacity: 2,
    });
    let node = TestNode::start(state).await;
    let mut client = node.client().await;

    client.add_user(user("dave", "p1")).await.unwrap();
    node.state
        .record_traffic("dave", 500, "1.2.3.4")
        .await
        .unwrap();

    let mut stream = client
        .traffic_stats(Interval { interval: 20 })
        .await
        .unwrap()
        .into_inner();

    let first = stream.message().await.unwrap().unwrap();
    assert_eq!(first.user_list.len(), 1);
    let row = &first.user_list[0];
    assert_eq!(row.username, "dave");
    assert_eq!(row.traffic, 500);
    assert_eq!(row.ip, "1.2.3.4");
    assert!(row.password.is_empty());
    assert!(row.created_at <= row.updated_at);
    assert!(node.state.liveness().is_attached());

    node.state
        .record_traffic("dave", 250, "1.2.3.4")
        .await
        .unwrap();
    let mut latest = 0;
    for _ in 0..20 {
        let list = stream.message().await.unwrap().unwrap();
        latest = list.user_list[0].traffic;
        if latest == 750 {
            break;
        }
    }
    assert_eq!(latest, 750);

    drop(stream);
    let liveness = node.state.liveness().clone();
    assert!(
        wait_until(|| !liveness.is_attached()).await,
        "liveness flag still set after client went away"
    );

    node.stop().await;
}

#[tokio::test]
async fn shutdown_ends_open_stream() {
    let node = TestNode::start(default_state()).await;
    let mut client = node.client().await;

    let mut stream = client
        .traffic_stats(Interval { interval: 0 })
        .await
        .unwrap()
        .into_inner();
    assert!(stream.message().await.unwrap().is_some());

    let liveness = node.state.liveness().clone();
    node.stop().await;
    assert!(!liveness.is_attached());

    // Remaining buffered snapshots drain, then the stream ends or errors.
    let ended = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match stream.message().await {
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => break,
            }
        }
    })
    .await;
    assert!(ended.is_ok());
}
