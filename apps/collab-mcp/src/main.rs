//! # Collab MCP Server
//!
//! Entry point for the MCP (Model Context Protocol) bridge to Mattermost.
//!
//! Reads configuration from environment variables:
//! - `MATTERMOST_URL` - Mattermost server URL
//! - `MATTERMOST_BOT_TOKEN` - Bearer token for the bot account
//! - `MATTERMOST_CHANNEL_ID` - Channel the agents share
//!
//! Communicates with the agent host via MCP over stdio and forwards tool
//! calls to the Mattermost HTTP API. Exits with status 1 if startup fails.

use clap::Parser;
use collab_mcp::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Logging to stderr only - stdout is reserved for MCP stdio transport.
    // COLLAB_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("COLLAB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "collab_mcp=info,collab_core=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_ansi(false),
                )
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
