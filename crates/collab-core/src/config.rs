//! # Configuration
//!
//! The bridge is configured entirely through three environment variables:
//!
//! - `MATTERMOST_URL` - base URL of the Mattermost server
//! - `MATTERMOST_BOT_TOKEN` - bearer token used for every API call
//! - `MATTERMOST_CHANNEL_ID` - channel that posts and history come from
//!
//! All three are required. They are checked one at a time so the error names
//! the first variable that is missing.

use crate::CollabError;
use std::fmt;

/// Environment variable holding the Mattermost base URL.
pub const URL_VAR: &str = "MATTERMOST_URL";
/// Environment variable holding the bot token.
pub const TOKEN_VAR: &str = "MATTERMOST_BOT_TOKEN";
/// Environment variable holding the target channel id.
pub const CHANNEL_ID_VAR: &str = "MATTERMOST_CHANNEL_ID";

/// Number of token characters shown by [`Config::token_preview`].
const TOKEN_PREVIEW_LEN: usize = 10;

/// Validated bridge configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL without a trailing slash.
    pub url: String,
    pub token: String,
    pub channel_id: String,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, CollabError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as absent ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CollabError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(CollabError::MissingEnv(name))
        };

        let url = require(URL_VAR)?;
        let token = require(TOKEN_VAR)?;
        let channel_id = require(CHANNEL_ID_VAR)?;

        let config = Self {
            url: normalize_url(&url).to_string(),
            token,
            channel_id,
        };
        tracing::debug!(url = %config.url, channel_id = %config.channel_id, "configuration loaded");
        Ok(config)
    }

    /// First characters of the token followed by `...`, for diagnostics.
    pub fn token_preview(&self) -> String {
        let head: String = self.token.chars().take(TOKEN_PREVIEW_LEN).collect();
        format!("{head}...")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .finish()
    }
}

/// Strip a single trailing `/` from a base URL.
pub fn normalize_url(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn env(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn load(vars: &BTreeMap<String, String>) -> Result<Config, CollabError> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    fn full() -> BTreeMap<String, String> {
        env(&[
            (URL_VAR, "https://chat.example.com/"),
            (TOKEN_VAR, "abcdefghijklmnop"),
            (CHANNEL_ID_VAR, "chan1"),
        ])
    }

    #[test]
    fn loads_and_normalizes() {
        let config = load(&full()).expect("config");
        assert_eq!(config.url, "https://chat.example.com");
        assert_eq!(config.token, "abcdefghijklmnop");
        assert_eq!(config.channel_id, "chan1");
    }

    #[test]
    fn each_missing_variable_is_named() {
        for name in [URL_VAR, TOKEN_VAR, CHANNEL_ID_VAR] {
            let mut vars = full();
            vars.remove(name);
            match load(&vars) {
                Err(CollabError::MissingEnv(missing)) => assert_eq!(missing, name),
                other => unreachable!("expected MissingEnv({name}), got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut vars = full();
        vars.insert(TOKEN_VAR.to_string(), String::new());
        let err = load(&vars).expect_err("empty token");
        assert_eq!(
            err.to_string(),
            "MATTERMOST_BOT_TOKEN environment variable is required"
        );
    }

    #[test]
    fn first_missing_variable_wins() {
        let err = load(&BTreeMap::new()).expect_err("nothing set");
        assert!(matches!(err, CollabError::MissingEnv(URL_VAR)));
    }

    #[test]
    fn strips_only_one_slash() {
        assert_eq!(normalize_url("http://host"), "http://host");
        assert_eq!(normalize_url("http://host/"), "http://host");
        assert_eq!(normalize_url("http://host//"), "http://host/");
    }

    #[test]
    fn debug_redacts_token() {
        let config = load(&full()).expect("config");
        let debug = format!("{config:?}");
        assert!(!debug.contains("abcdefghijklmnop"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn token_preview_truncates() {
        let config = load(&full()).expect("config");
        assert_eq!(config.token_preview(), "abcdefghij...");
    }
}
