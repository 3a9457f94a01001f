//! # Collab CLI
//!
//! ## Available Commands
//!
//! - `serve` - Serve the MCP tools over stdio (the default)
//! - `check` - Verify configuration and connectivity, then exit

use crate::client::MattermostClient;
use crate::server::CollabMcp;
use clap::{Parser, Subcommand};
use collab_core::{CHANNEL_ID_VAR, Config, TOKEN_VAR, URL_VAR};
use rmcp::{ServiceExt, transport::stdio};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Collab MCP - Mattermost tools for AI agents
///
/// Reads MATTERMOST_URL, MATTERMOST_BOT_TOKEN and MATTERMOST_CHANNEL_ID
/// from the environment.
#[derive(Parser, Debug)]
#[command(name = "collab-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve MCP tools over stdio (default)
    Serve,

    /// Test the Mattermost connection and exit
    Check {
        /// Identity used for the test post
        #[arg(long, default_value = "test-connection-bot")]
        identity: String,

        /// Only read; do not post a test message
        #[arg(long)]
        skip_post: bool,
    },
}

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the selected command.
pub async fn execute(cli: Cli) -> CliResult {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cmd_serve().await,
        Commands::Check {
            identity,
            skip_post,
        } => cmd_check(&identity, skip_post).await,
    }
}

/// Load config, resolve the channel, then serve until the host disconnects.
async fn cmd_serve() -> CliResult {
    let config = Config::from_env()?;
    tracing::info!("Collab MCP server starting, target: {}", config.url);

    let client = MattermostClient::new(&config).initialize().await?;
    let mcp = CollabMcp::new(client);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("MCP serve error: {:?}", e);
    })?;

    tracing::info!("Collab MCP server running on stdio");
    service.waiting().await?;
    Ok(())
}

/// Walk through config, channel lookup, a read and a post.
async fn cmd_check(identity: &str, skip_post: bool) -> CliResult {
    println!("Testing Mattermost MCP connection\n");

    let result = run_check(identity, skip_post).await;
    match &result {
        Ok(()) => println!("All checks passed. The MCP server is ready to use."),
        Err(e) => {
            eprintln!("\nConnection test failed: {e}\n");
            eprintln!("Troubleshooting:");
            eprintln!("- Verify environment variables are set correctly");
            eprintln!("- Check {URL_VAR} is reachable");
            eprintln!("- Verify {TOKEN_VAR} is valid and not expired");
            eprintln!("- Ensure the bot account is a member of the channel");
            eprintln!("- Check {CHANNEL_ID_VAR} is correct");
        }
    }
    result
}

async fn run_check(identity: &str, skip_post: bool) -> CliResult {
    println!("1. Loading configuration...");
    let config = Config::from_env()?;
    println!("   {URL_VAR}: {}", config.url);
    println!("   {TOKEN_VAR}: {}", config.token_preview());
    println!("   {CHANNEL_ID_VAR}: {}\n", config.channel_id);

    println!("2. Resolving channel...");
    let client = MattermostClient::new(&config).initialize().await?;
    match client.team_id() {
        Some(team) => println!("   Channel belongs to team {team}\n"),
        None => println!("   Channel has no team; search_messages will be unavailable\n"),
    }

    println!("3. Fetching 1 recent message...");
    let messages = client.get_recent_messages(1).await?;
    println!("   Retrieved {} message(s)", messages.len());
    if let Some(latest) = messages.first() {
        println!("   Latest from: {}", latest.username);
        println!("   Posted at:   {}", latest.timestamp);
    }
    println!();

    if skip_post {
        println!("4. Skipping test post\n");
        return Ok(());
    }

    println!("4. Posting test message...");
    let posted = client
        .post_message("Test connection successful - MCP server is working!", identity)
        .await?;
    println!("   Posted as:  {}", posted.username);
    println!("   Message ID: {}\n", posted.message_id);
    Ok(())
}
