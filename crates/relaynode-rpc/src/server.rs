//! gRPC server bootstrap.

use std::net::SocketAddr;
use std::time::Duration;

use relaynode_config::{Config, ServerConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::transport::server::TcpIncoming;
use tracing::{info, warn};

use crate::error::RpcError;
use crate::proto::server_server::ServerServer;
use crate::service::NodeService;
use crate::state::NodeState;

/// Bind `config.server.listen` and serve until `shutdown` is cancelled.
///
/// After cancellation, waits up to `shutdown_grace_secs` for in-flight calls.
/// Calls still running after that keep their connection tasks; this function
/// returns without waiting for them.
pub async fn run_with_shutdown(
    config: Config,
    state: NodeState,
    shutdown: CancellationToken,
) -> Result<(), RpcError> {
    let listen: SocketAddr = config
        .server
        .listen
        .trim()
        .parse()
        .map_err(|_| RpcError::Config("invalid listen address".into()))?;

    let listener = TcpListener::bind(listen).await?;
    serve_with_listener(listener, &config.server, state, shutdown).await
}

/// Serve on an already-bound listener.
pub async fn serve_with_listener(
    listener: TcpListener,
    config: &ServerConfig,
    state: NodeState,
    shutdown: CancellationToken,
) -> Result<(), RpcError> {
    let local_addr = listener.local_addr()?;
    let incoming = TcpIncoming::from_listener(listener, true, secs(config.tcp_keepalive_secs))
        .map_err(|e| RpcError::Io(std::io::Error::other(e)))?;

    let service = NodeService::new(state.with_shutdown(shutdown.clone()));
    let router = Server::builder()
        .http2_keepalive_interval(secs(config.keepalive_interval_secs))
        .http2_keepalive_timeout(secs(config.keepalive_timeout_secs))
        .add_service(ServerServer::new(service));

    info!(
        address = %local_addr,
        keepalive_interval_secs = config.keepalive_interval_secs,
        keepalive_timeout_secs = config.keepalive_timeout_secs,
        "listening"
    );

    let signal = shutdown.clone();
    let serve = router.serve_with_incoming_shutdown(incoming, async move {
        signal.cancelled().await;
        info!("shutdown signal received, stopping gRPC server");
    });

    let grace = Duration::from_secs(config.shutdown_grace_secs);
    let grace_elapsed = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = serve => result?,
        _ = grace_elapsed => {
            warn!(
                grace_secs = grace.as_secs(),
                "shutdown grace period elapsed, returning with calls still in flight"
            );
        }
    }

    info!("server stopped");
    Ok(())
}

/// `Some(n seconds)`, or `None` for 0.
fn secs(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}
