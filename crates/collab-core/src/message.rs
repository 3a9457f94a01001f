//! # Message Model
//!
//! [`Message`] is the only record agents ever see. It is rebuilt from a
//! remote [`Post`] on every call and never mutated afterwards.

use crate::{CollabError, Post, RemoteError};
use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

/// Characters of message text kept in a post confirmation.
pub const SUMMARY_LIMIT: usize = 100;

/// A chat message as reported to agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Identity override if one was recorded, otherwise the author's user id.
    pub username: String,
    pub text: String,
    /// RFC 3339, UTC, millisecond precision.
    pub timestamp: String,
    pub message_id: String,
}

impl Message {
    /// Project a stored post.
    pub fn from_post(post: &Post) -> Result<Self, RemoteError> {
        let username = post.override_username().unwrap_or(&post.user_id);
        Self::build(post, username)
    }

    /// Project a post that was just created under `identity`.
    pub fn posted(post: &Post, identity: &str) -> Result<Self, RemoteError> {
        Self::build(post, identity)
    }

    fn build(post: &Post, username: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            username: username.to_string(),
            text: post.message.clone(),
            timestamp: format_timestamp(post.create_at)?,
            message_id: post.id.clone(),
        })
    }
}

/// Render epoch milliseconds as e.g. `1970-01-01T00:00:00.000Z`.
pub fn format_timestamp(millis: i64) -> Result<String, RemoteError> {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
        .ok_or_else(|| RemoteError::Malformed(format!("create_at {millis} is out of range")))
}

/// Short human-readable confirmation for a freshly posted message.
pub fn confirmation(message: &Message) -> String {
    let mut chars = message.text.chars();
    let head: String = chars.by_ref().take(SUMMARY_LIMIT).collect();
    let ellipsis = if chars.next().is_some() { "..." } else { "" };
    format!("Posted as {}: {head}{ellipsis}", message.username)
}

/// Pretty-printed JSON array of messages.
pub fn to_json(messages: &[Message]) -> Result<String, CollabError> {
    Ok(serde_json::to_string_pretty(messages)?)
}
