//! # Error Taxonomy
//!
//! Every failure the bridge can report, as two closed enums.
//!
//! - [`CollabError`] is what callers see: configuration, initialization,
//!   remote, dispatch and encoding failures.
//! - [`RemoteError`] classifies what went wrong talking to Mattermost.
//!
//! Host-visible text is produced in exactly one place,
//! [`CollabError::to_tool_text`].

use thiserror::Error;

/// Failures returned by the Mattermost HTTP API or the transport beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Cannot reach the Mattermost server.
    #[error("Cannot connect to Mattermost at {0}")]
    ConnectionFailed(String),

    /// 401 - token missing, expired or revoked.
    #[error("Unauthorized: invalid or expired bot token")]
    Unauthorized,

    /// 403 - token is valid but lacks permission (e.g. bot not in channel).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404 - the channel, team or route does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 429 Too Many Requests.
    #[error("Rate limited: too many requests")]
    RateLimited,

    /// Any other non-success status.
    #[error("Server error ({0}): {1}")]
    Status(u16, String),

    /// The response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Errors that can occur anywhere in the bridge.
#[derive(Debug, Error)]
pub enum CollabError {
    /// A required environment variable is absent or empty.
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),

    /// Resolving the configured channel's team failed at startup.
    #[error("Failed to initialize channel {channel_id}: {source}")]
    Initialization {
        channel_id: String,
        #[source]
        source: RemoteError,
    },

    /// The configured channel has no owning team, so team-scoped search
    /// cannot be issued.
    #[error("Search is unavailable: channel {channel_id} does not belong to a team")]
    SearchUnavailable { channel_id: String },

    /// A call to the Mattermost API failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The host asked for a tool outside the catalog.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The tool arguments could not be decoded.
    #[error("Invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// A result could not be rendered as text.
    #[error("Encoding error: {0}")]
    Encode(String),
}

impl CollabError {
    /// Render this failure as the text placed in an error-flagged tool reply.
    pub fn to_tool_text(&self) -> String {
        format!("Error: {self}")
    }
}

impl From<serde_json::Error> for CollabError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err.to_string())
    }
}
