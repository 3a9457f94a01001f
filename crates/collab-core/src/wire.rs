//! # Mattermost Wire Shapes
//!
//! Serde models for the slice of the Mattermost v4 API the bridge touches:
//! channel lookup, post creation, team search and channel history.
//! Unknown fields are ignored so newer servers keep working.

use crate::RemoteError;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Post prop that carries the display-identity override.
pub const OVERRIDE_USERNAME: &str = "override_username";

/// `GET /api/v4/channels/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    /// Empty for direct and group message channels.
    #[serde(default)]
    pub team_id: String,
}

impl Channel {
    /// Owning team, if the channel has one.
    pub fn team(&self) -> Option<&str> {
        (!self.team_id.is_empty()).then_some(self.team_id.as_str())
    }
}

/// A post as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub create_at: i64,
    #[serde(default)]
    pub props: Option<Map<String, Value>>,
}

impl Post {
    /// The `override_username` prop, when present and a string.
    pub fn override_username(&self) -> Option<&str> {
        self.props
            .as_ref()
            .and_then(|props| props.get(OVERRIDE_USERNAME))
            .and_then(Value::as_str)
    }
}

/// Body of `POST /api/v4/posts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPost {
    pub channel_id: String,
    pub message: String,
    pub props: Map<String, Value>,
}

impl NewPost {
    /// A post in `channel_id` displayed under `identity`.
    pub fn with_identity(channel_id: &str, message: &str, identity: &str) -> Self {
        let mut props = Map::new();
        props.insert(OVERRIDE_USERNAME.into(), Value::String(identity.into()));
        Self {
            channel_id: channel_id.into(),
            message: message.into(),
            props,
        }
    }
}

/// Body of `POST /api/v4/teams/{team_id}/posts/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub terms: String,
    pub is_or_search: bool,
}

impl SearchParams {
    /// Keyword search where every term must match.
    pub fn all_terms(terms: &str) -> Self {
        Self {
            terms: terms.into(),
            is_or_search: false,
        }
    }
}

/// Post list returned by channel history and search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PostList {
    /// Post ids, newest first for channel history.
    #[serde(default, deserialize_with = "null_as_default")]
    pub order: Vec<String>,
    /// The `posts` object, kept in the order its keys appear in the body.
    #[serde(default, deserialize_with = "posts_in_document_order")]
    pub posts: Vec<(String, Post)>,
}

impl PostList {
    /// Posts in the enumeration order of the `posts` object.
    ///
    /// No sorting happens here; callers that need recency use [`Self::in_order`].
    pub fn in_map_order(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().map(|(_, post)| post)
    }

    /// Posts resolved through `order`.
    ///
    /// An id listed in `order` but absent from `posts` means the response is
    /// malformed.
    pub fn in_order(&self) -> Result<Vec<&Post>, RemoteError> {
        let by_id: HashMap<&str, &Post> = self
            .posts
            .iter()
            .map(|(id, post)| (id.as_str(), post))
            .collect();

        self.order
            .iter()
            .map(|id| {
                by_id.get(id.as_str()).copied().ok_or_else(|| {
                    RemoteError::Malformed(format!("post {id} listed in order but missing"))
                })
            })
            .collect()
    }
}

/// Error payload Mattermost attaches to non-2xx responses.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub status_code: u16,
}

// =============================================================================
// DESERIALIZATION HELPERS
// =============================================================================

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn posts_in_document_order<'de, D>(deserializer: D) -> Result<Vec<(String, Post)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct PostsVisitor;

    impl<'de> Visitor<'de> for PostsVisitor {
        type Value = Vec<(String, Post)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an object mapping post ids to posts")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut posts = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((id, post)) = map.next_entry::<String, Post>()? {
                posts.push((id, post));
            }
            Ok(posts)
        }
    }

    deserializer.deserialize_any(PostsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_without_team() {
        let channel: Channel = serde_json::from_value(json!({"id": "dm", "team_id": ""}))
            .expect("channel");
        assert_eq!(channel.team(), None);

        let channel: Channel =
            serde_json::from_value(json!({"id": "c1", "team_id": "t1", "name": "town-square"}))
                .expect("channel");
        assert_eq!(channel.team(), Some("t1"));
    }

    #[test]
    fn override_username_must_be_string() {
        let post: Post = serde_json::from_value(json!({
            "id": "p1", "user_id": "u1", "message": "hi", "create_at": 0,
            "props": {"override_username": 42}
        }))
        .expect("post");
        assert_eq!(post.override_username(), None);

        let post: Post = serde_json::from_value(json!({
            "id": "p1", "message": "hi", "create_at": 0, "props": null
        }))
        .expect("post");
        assert_eq!(post.override_username(), None);
    }

    #[test]
    fn new_post_carries_identity() {
        let body = serde_json::to_value(NewPost::with_identity("c1", "hello", "demo-bot"))
            .expect("encode");
        assert_eq!(
            body,
            json!({
                "channel_id": "c1",
                "message": "hello",
                "props": {"override_username": "demo-bot"}
            })
        );
    }

    #[test]
    fn search_is_and_search() {
        let body = serde_json::to_value(SearchParams::all_terms("deploy failed")).expect("encode");
        assert_eq!(body, json!({"terms": "deploy failed", "is_or_search": false}));
    }

    #[test]
    fn posts_keep_document_order() {
        let list: PostList = serde_json::from_str(
            r#"{
                "order": ["a", "b", "c"],
                "posts": {
                    "c": {"id": "c", "message": "third", "create_at": 3},
                    "a": {"id": "a", "message": "first", "create_at": 1},
                    "b": {"id": "b", "message": "second", "create_at": 2}
                }
            }"#,
        )
        .expect("list");

        let map_order: Vec<&str> = list.in_map_order().map(|p| p.id.as_str()).collect();
        assert_eq!(map_order, ["c", "a", "b"]);

        let ordered: Vec<&str> = list
            .in_order()
            .expect("ordered")
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ordered, ["a", "b", "c"]);
    }

    #[test]
    fn null_fields_are_empty() {
        let list: PostList =
            serde_json::from_value(json!({"order": null, "posts": null})).expect("list");
        assert!(list.order.is_empty());
        assert!(list.posts.is_empty());

        let list: PostList = serde_json::from_value(json!({})).expect("list");
        assert_eq!(list, PostList::default());
    }

    #[test]
    fn dangling_order_id_is_malformed() {
        let list: PostList = serde_json::from_value(json!({
            "order": ["missing"],
            "posts": {}
        }))
        .expect("list");
        assert!(matches!(list.in_order(), Err(RemoteError::Malformed(_))));
    }

    #[test]
    fn api_error_body() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "id": "api.context.session_expired.app_error",
            "message": "Invalid or expired session, please login again.",
            "status_code": 401
        }))
        .expect("error body");
        assert_eq!(body.status_code, 401);
        assert!(body.message.starts_with("Invalid or expired session"));
    }
}
