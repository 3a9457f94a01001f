//! # Mattermost HTTP Client
//!
//! Wrapper around the Mattermost v4 REST API for use by the MCP server.
//!
//! A [`MattermostClient`] can post and read channel history straight away.
//! Search is scoped to the channel's team, so it only exists on the
//! [`ReadyClient`] returned by [`MattermostClient::initialize`]:
//!
//! ```compile_fail
//! # async fn demo(config: collab_core::Config) {
//! let client = collab_mcp::client::MattermostClient::new(&config);
//! let _ = client.search_messages("deploy", 10).await;
//! # }
//! ```

use collab_core::{
    ApiErrorBody, Channel, CollabError, Config, Message, NewPost, PostList, RemoteError,
    SearchParams,
};
use serde::de::DeserializeOwned;

/// Path prefix of every Mattermost REST route.
const API_V4: &str = "/api/v4";

/// HTTP client bound to one Mattermost server, token and channel.
#[derive(Clone)]
pub struct MattermostClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    channel_id: String,
}

impl MattermostClient {
    /// Create a client from validated configuration. No request is sent.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.url.clone(),
            token: config.token.clone(),
            channel_id: config.channel_id.clone(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Build a request with Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{API_V4}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .bearer_auth(&self.token)
            .header("X-Requested-With", "XMLHttpRequest")
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        req.send()
            .await
            .map_err(|e| RemoteError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Handle HTTP response: check status codes and decode JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, RemoteError> {
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| RemoteError::Malformed(format!("unreadable body: {e}")))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| RemoteError::Malformed(e.to_string()))
    }

    /// GET /channels/{channel_id}
    pub async fn get_channel(&self) -> Result<Channel, RemoteError> {
        let path = format!("/channels/{}", self.channel_id);
        let req = self.request(reqwest::Method::GET, &path);
        let resp = self.send(req).await?;
        self.handle_response(resp).await
    }

    /// Resolve the channel's team and hand back a client that can search.
    pub async fn initialize(self) -> Result<ReadyClient, CollabError> {
        let channel = self
            .get_channel()
            .await
            .map_err(|source| CollabError::Initialization {
                channel_id: self.channel_id.clone(),
                source,
            })?;

        let team_id = channel.team().map(str::to_string);
        match &team_id {
            Some(team) => tracing::info!(channel = %channel.id, team = %team, "channel resolved"),
            None => tracing::warn!(
                channel = %channel.id,
                "channel has no team; search_messages will be unavailable"
            ),
        }

        Ok(ReadyClient {
            client: self,
            team_id,
        })
    }

    /// POST /posts with `props.override_username = identity`.
    pub async fn post_message(&self, text: &str, identity: &str) -> Result<Message, CollabError> {
        let body = NewPost::with_identity(&self.channel_id, text, identity);
        let req = self.request(reqwest::Method::POST, "/posts").json(&body);
        let resp = self.send(req).await?;
        let post = self.handle_response(resp).await?;
        tracing::debug!(identity, "message posted");
        Ok(Message::posted(&post, identity)?)
    }

    /// GET /channels/{channel_id}/posts, first page, newest first.
    pub async fn get_recent_messages(&self, limit: u32) -> Result<Vec<Message>, CollabError> {
        let path = format!("/channels/{}/posts", self.channel_id);
        let req = self
            .request(reqwest::Method::GET, &path)
            .query(&[("page", 0), ("per_page", limit)]);
        let resp = self.send(req).await?;
        let list: PostList = self.handle_response(resp).await?;

        let messages = list
            .in_order()?
            .into_iter()
            .take(limit as usize)
            .map(Message::from_post)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}

/// A client whose channel has been resolved to a team.
#[derive(Clone)]
pub struct ReadyClient {
    client: MattermostClient,
    team_id: Option<String>,
}

impl ReadyClient {
    /// Team owning the configured channel; `None` for direct messages.
    pub fn team_id(&self) -> Option<&str> {
        self.team_id.as_deref()
    }

    pub fn channel_id(&self) -> &str {
        self.client.channel_id()
    }

    pub async fn post_message(&self, text: &str, identity: &str) -> Result<Message, CollabError> {
        self.client.post_message(text, identity).await
    }

    pub async fn get_recent_messages(&self, limit: u32) -> Result<Vec<Message>, CollabError> {
        self.client.get_recent_messages(limit).await
    }

    /// POST /teams/{team_id}/posts/search with every term required.
    ///
    /// Results keep the order of the response's `posts` object and are cut
    /// to `limit` without any re-sorting.
    pub async fn search_messages(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Message>, CollabError> {
        let team_id = self
            .team_id
            .as_deref()
            .ok_or_else(|| CollabError::SearchUnavailable {
                channel_id: self.client.channel_id.clone(),
            })?;

        let path = format!("/teams/{team_id}/posts/search");
        let req = self
            .client
            .request(reqwest::Method::POST, &path)
            .json(&SearchParams::all_terms(query));
        let resp = self.client.send(req).await?;
        let list: PostList = self.client.handle_response(resp).await?;

        let messages = list
            .in_map_order()
            .take(limit as usize)
            .map(Message::from_post)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}

/// Map a non-success status to a [`RemoteError`], preferring the server's
/// own error message when the body carries one.
fn status_error(status: reqwest::StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|err| err.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                body.trim().to_string()
            }
        });

    match status {
        reqwest::StatusCode::UNAUTHORIZED => RemoteError::Unauthorized,
        reqwest::StatusCode::FORBIDDEN => RemoteError::Forbidden(message),
        reqwest::StatusCode::NOT_FOUND => RemoteError::NotFound(message),
        reqwest::StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
        _ => RemoteError::Status(status.as_u16(), message),
    }
}
