//! # Feed Client Configuration
//!
//! Configuration for the feed coordinator, the interaction stores and the
//! HTTP gateway adapter.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::LikeFailurePolicy;

/// Configuration validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A base URL is not an absolute http(s) URL.
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl {
        /// Offending field
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Request timeout of zero.
    #[error("request_timeout_ms cannot be 0")]
    ZeroTimeout,

    /// Empty authorization scheme.
    #[error("auth_scheme cannot be empty")]
    EmptyAuthScheme,

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

/// Feed client configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedClientConfig {
    /// Base URL of the JSON API (endpoints are joined onto it).
    pub api_base_url: String,

    /// Base URL that relative image paths are resolved against.
    pub media_base_url: String,

    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,

    /// Authorization header scheme (`<scheme> <token>`).
    pub auth_scheme: String,

    /// What happens to an optimistic like the server rejects.
    pub like_failure_policy: LikeFailurePolicy,

    /// Directory downloaded images are written to.
    pub download_dir: PathBuf,

    /// Query "did I like this" for every post after a feed load.
    pub hydrate_likes: bool,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api/".to_string(),
            media_base_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_ms: 10_000,
            auth_scheme: "Token".to_string(),
            like_failure_policy: LikeFailurePolicy::Revert,
            download_dir: PathBuf::from("downloads"),
            hydrate_likes: true,
        }
    }
}

impl FeedClientConfig {
    /// Create a config for testing (short timeout, no hydration).
    pub fn for_testing() -> Self {
        Self {
            api_base_url: "http://feed.test/api/".to_string(),
            media_base_url: "http://feed.test".to_string(),
            request_timeout_ms: 500,
            hydrate_likes: false,
            download_dir: env::temp_dir().join("feed-sync-test-downloads"),
            ..Self::default()
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FEED_API_BASE_URL`: API base (default: http://127.0.0.1:8000/api/)
    /// - `FEED_MEDIA_BASE_URL`: media base (default: http://127.0.0.1:8000)
    /// - `FEED_REQUEST_TIMEOUT_MS`: request timeout (default: 10000)
    /// - `FEED_AUTH_SCHEME`: authorization scheme (default: Token)
    /// - `FEED_LIKE_FAILURE_POLICY`: `revert` or `keep` (default: revert)
    /// - `FEED_DOWNLOAD_DIR`: download directory (default: downloads)
    /// - `FEED_HYDRATE_LIKES`: hydrate like state after load (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url: env::var("FEED_API_BASE_URL").unwrap_or(defaults.api_base_url),

            media_base_url: env::var("FEED_MEDIA_BASE_URL").unwrap_or(defaults.media_base_url),

            request_timeout_ms: env::var("FEED_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_ms),

            auth_scheme: env::var("FEED_AUTH_SCHEME").unwrap_or(defaults.auth_scheme),

            like_failure_policy: env::var("FEED_LIKE_FAILURE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.like_failure_policy),

            download_dir: env::var("FEED_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),

            hydrate_likes: env::var("FEED_HYDRATE_LIKES")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.hydrate_likes),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("media_base_url", &self.media_base_url),
        ] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if self.auth_scheme.trim().is_empty() {
            return Err(ConfigError::EmptyAuthScheme);
        }

        Ok(())
    }
}
