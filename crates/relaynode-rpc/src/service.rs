//! gRPC service implementation.

use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

use crate::convert::user_records;
use crate::proto::server_server::Server as NodeRpc;
use crate::proto::{Empty, Interval, User, UserList};
use crate::state::{CommandReply, NodeCommand, NodeState};

/// Control-plane service handed to the tonic router.
#[derive(Debug, Clone)]
pub struct NodeService {
    state: NodeState,
}

impl NodeService {
    pub fn new(state: NodeState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }
}

#[tonic::async_trait]
impl NodeRpc for NodeService {
    async fn add_user(&self, request: Request<User>) -> Result<Response<Empty>, Status> {
        self.state.handle(NodeCommand::AddUser(request.into_inner().into()));
        Ok(Response::new(Empty {}))
    }

    async fn update_user(&self, request: Request<User>) -> Result<Response<Empty>, Status> {
        self.state.handle(NodeCommand::UpdateUser(request.into_inner().into()));
        Ok(Response::new(Empty {}))
    }

    async fn delete_user(&self, request: Request<User>) -> Result<Response<Empty>, Status> {
        self.state.handle(NodeCommand::DeleteUser(request.into_inner().into()));
        Ok(Response::new(Empty {}))
    }

    async fn sync_user(&self, request: Request<UserList>) -> Result<Response<Empty>, Status> {
        let users = user_records(request.into_inner());
        debug!(count = users.len(), "user list received");
        self.state.handle(NodeCommand::SyncUsers(users));
        Ok(Response::new(Empty {}))
    }

    type TrafficStatsStream = ReceiverStream<Result<UserList, Status>>;

    async fn traffic_stats(
        &self,
        request: Request<Interval>,
    ) -> Result<Response<Self::TrafficStatsStream>, Status> {
        let peer = request.remote_addr();
        let interval_ms = request.into_inner().interval;
        info!(peer = ?peer, interval_ms, "traffic stats requested");

        match self.state.handle(NodeCommand::TrafficStats { interval_ms }) {
            CommandReply::Stream(rx) => Ok(Response::new(ReceiverStream::new(rx))),
            other => Err(Status::internal(format!("unexpected reply: {other:?}"))),
        }
    }
}
