//! # Collab MCP Server
//!
//! Implements `ServerHandler` with 3 MCP tools that proxy to the Mattermost
//! HTTP API.
//!
//! Every tool call runs inside [`CollabMcp::dispatch`], which turns unknown
//! tools, malformed arguments and remote failures into error-flagged replies.
//! The MCP connection itself never sees a tool-level failure.

use crate::client::ReadyClient;
use collab_core::{CollabError, confirmation, to_json};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    schemars,
    service::RequestContext,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Default `limit` for search and history.
pub const DEFAULT_LIMIT: u32 = 10;

pub const POST_MESSAGE: &str = "post_message";
pub const SEARCH_MESSAGES: &str = "search_messages";
pub const GET_RECENT_MESSAGES: &str = "get_recent_messages";

// =============================================================================
// MCP SERVER
// =============================================================================

/// MCP server that bridges to one Mattermost channel.
#[derive(Clone)]
pub struct CollabMcp {
    client: ReadyClient,
}

// =============================================================================
// TOOL PARAMETER STRUCTS
// =============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PostMessageParams {
    /// The message content to post.
    #[schemars(description = "The message content to post")]
    pub text: String,
    /// Display identity the post is shown under.
    #[schemars(
        description = "Your agent identity in format: {project}-{human}-bot (e.g., \"pars-craig-bot\")"
    )]
    pub identity: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchMessagesParams {
    /// Keyword query.
    #[schemars(description = "Search query (supports Mattermost search syntax)")]
    pub query: String,
    /// Maximum number of results (default: 10).
    #[schemars(description = "Maximum number of results to return (default: 10)")]
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecentMessagesParams {
    /// Number of messages to fetch (default: 10).
    #[schemars(description = "Number of recent messages to retrieve (default: 10)")]
    pub limit: Option<u32>,
}

/// A decoded tool invocation.
#[derive(Debug)]
pub enum ToolCall {
    PostMessage(PostMessageParams),
    SearchMessages(SearchMessagesParams),
    GetRecentMessages(GetRecentMessagesParams),
}

impl ToolCall {
    /// Match `name` against the catalog and decode its arguments.
    pub fn parse(name: &str, arguments: Option<JsonObject>) -> Result<Self, CollabError> {
        let args = serde_json::Value::Object(arguments.unwrap_or_default());
        match name {
            POST_MESSAGE => decode(name, args).map(Self::PostMessage),
            SEARCH_MESSAGES => decode(name, args).map(Self::SearchMessages),
            GET_RECENT_MESSAGES => decode(name, args).map(Self::GetRecentMessages),
            other => Err(CollabError::UnknownTool(other.to_string())),
        }
    }
}

fn decode<T: DeserializeOwned>(tool: &str, args: serde_json::Value) -> Result<T, CollabError> {
    serde_json::from_value(args).map_err(|e| CollabError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// TOOL CATALOG
// =============================================================================

/// The fixed set of tools advertised to the host.
pub fn catalog() -> Vec<Tool> {
    vec![
        Tool::new(
            POST_MESSAGE,
            "Post a message to the shared Mattermost channel with your agent identity",
            input_schema::<PostMessageParams>(),
        ),
        Tool::new(
            SEARCH_MESSAGES,
            "Search messages in the shared Mattermost channel's team using keyword search",
            input_schema::<SearchMessagesParams>(),
        ),
        Tool::new(
            GET_RECENT_MESSAGES,
            "Get recent messages from the shared Mattermost channel, newest first",
            input_schema::<GetRecentMessagesParams>(),
        ),
    ]
}

/// Input schema of a derived parameter struct.
///
/// Derived struct schemas always serialize to a JSON object, so the empty
/// fallback is never advertised for the catalog above; it would only mean
/// "any arguments", which `ToolCall::parse` still rejects when they do not
/// decode.
fn input_schema<T: schemars::JsonSchema>() -> Arc<JsonObject> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        _ => Arc::new(JsonObject::new()),
    }
}

// =============================================================================
// TOOL DISPATCH
// =============================================================================

/// Transport-independent result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    pub text: String,
    pub is_error: bool,
}

impl ToolReply {
    fn success(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn failure(err: &CollabError) -> Self {
        Self {
            text: err.to_tool_text(),
            is_error: true,
        }
    }

    /// Wrap as a single text block, flagged when the call failed.
    pub fn into_call_result(self) -> CallToolResult {
        let content = vec![Content::text(self.text)];
        if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl CollabMcp {
    pub fn new(client: ReadyClient) -> Self {
        Self { client }
    }

    /// Run one tool call; failures come back as error-flagged replies.
    pub async fn dispatch(&self, name: &str, arguments: Option<JsonObject>) -> ToolReply {
        tracing::info!(tool = name, "tool call");
        match self.run(name, arguments).await {
            Ok(text) => ToolReply::success(text),
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "tool call failed");
                ToolReply::failure(&e)
            }
        }
    }

    async fn run(&self, name: &str, arguments: Option<JsonObject>) -> Result<String, CollabError> {
        match ToolCall::parse(name, arguments)? {
            ToolCall::PostMessage(PostMessageParams { text, identity }) => {
                let message = self.client.post_message(&text, &identity).await?;
                Ok(confirmation(&message))
            }
            ToolCall::SearchMessages(SearchMessagesParams { query, limit }) => {
                let limit = limit.unwrap_or(DEFAULT_LIMIT);
                let messages = self.client.search_messages(&query, limit).await?;
                to_json(&messages)
            }
            ToolCall::GetRecentMessages(GetRecentMessagesParams { limit }) => {
                let limit = limit.unwrap_or(DEFAULT_LIMIT);
                let messages = self.client.get_recent_messages(limit).await?;
                to_json(&messages)
            }
        }
    }
}

// =============================================================================
// SERVER HANDLER
// =============================================================================

impl ServerHandler for CollabMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Mattermost collaboration server. Use post_message to talk to other agents \
                 under your identity, get_recent_messages to catch up on the channel, and \
                 search_messages to find earlier discussion."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(catalog()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let reply = self.dispatch(&request.name, request.arguments).await;
        Ok(reply.into_call_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Option<JsonObject> {
        match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn search_limit(arguments: serde_json::Value) -> u32 {
        match ToolCall::parse(SEARCH_MESSAGES, args(arguments)) {
            Ok(ToolCall::SearchMessages(p)) => p.limit.unwrap_or(DEFAULT_LIMIT),
            other => unreachable!("unexpected parse: {other:?}"),
        }
    }

    fn recent_limit(arguments: Option<JsonObject>) -> u32 {
        match ToolCall::parse(GET_RECENT_MESSAGES, arguments) {
            Ok(ToolCall::GetRecentMessages(p)) => p.limit.unwrap_or(DEFAULT_LIMIT),
            other => unreachable!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn limits_default_to_ten() {
        assert_eq!(search_limit(json!({"query": "deploy"})), DEFAULT_LIMIT);
        assert_eq!(recent_limit(None), DEFAULT_LIMIT);
        assert_eq!(recent_limit(args(json!({}))), DEFAULT_LIMIT);
    }

    #[test]
    fn null_limit_means_default() {
        assert_eq!(
            search_limit(json!({"query": "q", "limit": null})),
            DEFAULT_LIMIT
        );
        assert_eq!(recent_limit(args(json!({"limit": null}))), DEFAULT_LIMIT);
    }

    #[test]
    fn explicit_limit_is_used() {
        assert_eq!(recent_limit(args(json!({"limit": 3}))), 3);
        assert_eq!(search_limit(json!({"query": "q", "limit": 0})), 0);
    }

    #[test]
    fn unknown_tool_is_reported() {
        let err = ToolCall::parse("delete_everything", None).expect_err("unknown");
        assert_eq!(err.to_tool_text(), "Error: Unknown tool: delete_everything");
    }

    #[test]
    fn missing_required_argument_is_invalid() {
        let err = ToolCall::parse(POST_MESSAGE, args(json!({"text": "hi"}))).expect_err("no identity");
        match err {
            CollabError::InvalidArguments { tool, reason } => {
                assert_eq!(tool, POST_MESSAGE);
                assert!(reason.contains("identity"));
            }
            other => unreachable!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn negative_limit_is_invalid() {
        let err = ToolCall::parse(SEARCH_MESSAGES, args(json!({"query": "q", "limit": -1})))
            .expect_err("negative");
        assert!(matches!(err, CollabError::InvalidArguments { .. }));
    }

    #[test]
    fn reply_maps_to_error_flag() {
        let failed = ToolReply::failure(&CollabError::UnknownTool("x".into())).into_call_result();
        assert_eq!(failed.is_error, Some(true));

        let ok = ToolReply::success("done".into()).into_call_result();
        assert_eq!(ok.is_error, Some(false));
    }
}
