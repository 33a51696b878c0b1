//! # Outbound Ports
//!
//! Traits for the collaborators the core depends on: the remote API, the
//! credential holder, navigation and local asset materialization.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::domain::{AuthToken, FeedError, GatewayError, PostId, Route, SavedAsset};

/// HTTP-ish verb of a logical endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    /// Read.
    Get,
    /// Create.
    Post,
    /// Replace.
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

/// Logical endpoints the core calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endpoint {
    /// Read the feed collection.
    FetchPosts,
    /// Read one post.
    GetPost {
        /// Post to read.
        id: PostId,
    },
    /// Create a text post.
    CreatePost {
        /// Post body.
        content: String,
    },
    /// Replace a post's text.
    UpdatePost {
        /// Post to update.
        id: PostId,
        /// New body.
        content: String,
    },
    /// Like a post as the current user.
    CreateLike {
        /// Post to like.
        post_id: PostId,
    },
    /// Read the likes of a post.
    QueryLikes {
        /// Post whose likes are listed.
        post_id: PostId,
    },
    /// Comment on a post.
    CreateComment {
        /// Post to comment on.
        post_id: PostId,
        /// Trimmed comment text.
        content: String,
    },
    /// Read the signed-in user.
    CurrentUser,
}

impl Endpoint {
    /// Stable key used for logging and mock scripting.
    pub fn kind(&self) -> &'static str {
        match self {
            Endpoint::FetchPosts => "fetch_posts",
            Endpoint::GetPost { .. } => "get_post",
            Endpoint::CreatePost { .. } => "create_post",
            Endpoint::UpdatePost { .. } => "update_post",
            Endpoint::CreateLike { .. } => "create_like",
            Endpoint::QueryLikes { .. } => "query_likes",
            Endpoint::CreateComment { .. } => "create_comment",
            Endpoint::CurrentUser => "current_user",
        }
    }

    /// Verb for this endpoint.
    pub fn method(&self) -> Method {
        match self {
            Endpoint::FetchPosts
            | Endpoint::GetPost { .. }
            | Endpoint::QueryLikes { .. }
            | Endpoint::CurrentUser => Method::Get,
            Endpoint::CreatePost { .. }
            | Endpoint::CreateLike { .. }
            | Endpoint::CreateComment { .. } => Method::Post,
            Endpoint::UpdatePost { .. } => Method::Put,
        }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Endpoint::FetchPosts | Endpoint::CreatePost { .. } => "posts/".to_string(),
            Endpoint::GetPost { id } | Endpoint::UpdatePost { id, .. } => format!("posts/{id}/"),
            Endpoint::CreateLike { .. } | Endpoint::QueryLikes { .. } => "likes/".to_string(),
            Endpoint::CreateComment { .. } => "comments/".to_string(),
            Endpoint::CurrentUser => "auth/users/me/".to_string(),
        }
    }

    /// Query-string pairs.
    pub fn query(&self) -> Vec<(String, String)> {
        match self {
            Endpoint::QueryLikes { post_id } => {
                vec![("post".to_string(), post_id.to_string())]
            }
            _ => Vec::new(),
        }
    }

    /// JSON body, for writes.
    pub fn payload(&self) -> Option<Value> {
        match self {
            Endpoint::CreatePost { content } | Endpoint::UpdatePost { content, .. } => {
                Some(json!({ "content": content }))
            }
            Endpoint::CreateLike { post_id } => Some(json!({ "post": post_id.as_str() })),
            Endpoint::CreateComment { post_id, content } => Some(json!({
                "post": post_id.as_str(),
                "content": content,
            })),
            _ => None,
        }
    }
}

/// One call through the gateway.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    /// Logical endpoint.
    pub endpoint: Endpoint,
    /// Verb.
    pub method: Method,
    /// JSON body.
    pub payload: Option<Value>,
    /// Bearer credential, when one is available.
    pub auth: Option<AuthToken>,
}

impl ApiRequest {
    /// Build a request with the endpoint's verb and payload.
    pub fn new(endpoint: Endpoint, auth: Option<AuthToken>) -> Self {
        Self {
            method: endpoint.method(),
            payload: endpoint.payload(),
            endpoint,
            auth,
        }
    }
}

/// Remote API boundary - outbound port.
///
/// Each call is an independent RPC; retries and timeouts belong to the
/// implementation, and a timeout is reported as `GatewayError::Network`.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Perform a JSON call.
    async fn call(&self, request: ApiRequest) -> Result<Value, GatewayError>;

    /// Fetch a binary resource by absolute URI.
    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>, GatewayError>;
}

/// Bearer credential holder - outbound port.
///
/// The core only reads the token; `clear` is reserved for logout.
pub trait CredentialProvider: Send + Sync {
    /// Current token, if signed in.
    fn get(&self) -> Option<AuthToken>;

    /// Forget the token.
    fn clear(&self);
}

/// Navigation sink - outbound port.
pub trait Navigator: Send + Sync {
    /// Request navigation to `route`.
    fn navigate(&self, route: Route);
}

/// Local asset materialization - outbound port.
#[async_trait]
pub trait AssetSink: Send + Sync {
    /// Store downloaded bytes as a user-visible artifact.
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<SavedAsset, FeedError>;

    /// Hand a URI to an external viewer.
    async fn open_external(&self, uri: &str) -> Result<(), FeedError>;
}
