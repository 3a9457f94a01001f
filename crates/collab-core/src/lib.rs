//! # collab-core
//!
//! The pure half of the Mattermost collaboration bridge.
//!
//! This crate knows how the bridge is configured, what a [`Message`] looks
//! like, how the remote service shapes its payloads, and how every failure is
//! classified. It performs no I/O beyond reading the process environment in
//! [`Config::from_env`].
//!
//! ## Layout
//!
//! - `config` → three required environment values, URL normalization
//! - `message` → the normalized record handed back to agents
//! - `wire` → serde models of the remote channel/post/search payloads
//! - `error` → the closed failure taxonomy and its host-visible rendering

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod error;
pub mod message;
pub mod wire;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{CHANNEL_ID_VAR, Config, TOKEN_VAR, URL_VAR, normalize_url};
pub use error::{CollabError, RemoteError};
pub use message::{Message, SUMMARY_LIMIT, confirmation, format_timestamp, to_json};
pub use wire::{ApiErrorBody, Channel, NewPost, OVERRIDE_USERNAME, Post, PostList, SearchParams};
