//! Unified relaynode CLI.
//!
//! - `relaynode serve` - Run the control-plane gRPC service
//!
//! The service can also be run as the standalone `relaynode-rpc` binary.

use std::process::ExitCode;

use clap::{Parser, Subcommand};

/// relaynode unified CLI.
#[derive(Parser)]
#[command(
    name = "relaynode",
    version,
    about = "Control-plane agent for proxy and relay nodes",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control-plane gRPC service.
    #[command(name = "serve", alias = "server")]
    Serve(Box<relaynode_rpc::RpcArgs>),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => relaynode_rpc::cli::run(*args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
