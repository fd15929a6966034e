//! relaynode gRPC service standalone binary.

use clap::Parser;
use relaynode_rpc::{RpcArgs, cli};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = RpcArgs::parse();
    cli::run(args).await
}
