//! # collab-mcp
//!
//! MCP bridge that lets AI agents share a Mattermost channel.
//!
//! ```text
//! agent host ──MCP (stdio)──▶ CollabMcp ──▶ ReadyClient ──HTTP──▶ Mattermost
//! ```
//!
//! - `client` → Mattermost v4 REST calls, team resolution
//! - `server` → tool catalog, dispatch, `ServerHandler`
//! - `cli` → `serve` and `check` commands

pub mod cli;
pub mod client;
pub mod server;

pub use client::{MattermostClient, ReadyClient};
pub use server::{CollabMcp, ToolReply, catalog};
