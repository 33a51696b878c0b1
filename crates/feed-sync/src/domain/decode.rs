//! # Lenient Response Decoding
//!
//! Turns raw server JSON into domain entities.
//!
//! Only the overall shape of a response can fail (a feed body that is not a
//! collection). Every field of a post or comment degrades on its own to a
//! fallback, so one bad field never hides the rest of the post.

use serde_json::Value;

use super::entities::{Comment, Post};
use super::errors::FeedError;
use super::invariants::{NO_COMMENT_TEXT, NO_POST_CONTENT};
use super::value_objects::{Author, CommentId, CurrentUser, LocalId, PostId, Timestamp};

/// Decode a feed response into post snapshots, preserving server order.
///
/// Accepts a bare array or a paginated `{"results": [...]}` envelope.
/// Entries that are not objects or carry no usable id are dropped.
pub fn decode_posts(body: &Value, media_base_url: &str) -> Result<Vec<Post>, FeedError> {
    let entries = collection(body).ok_or_else(|| {
        FeedError::MalformedResponse(format!(
            "expected a list of posts, got {}",
            type_name(body)
        ))
    })?;

    let posts: Vec<Post> = entries
        .iter()
        .filter_map(|entry| {
            let post = decode_post(entry, media_base_url);
            if post.is_none() {
                tracing::warn!("[feed-sync] Dropping feed entry without a usable id");
            }
            post
        })
        .collect();

    Ok(posts)
}

/// Decode one post object.
pub fn decode_post(value: &Value, media_base_url: &str) -> Option<Post> {
    let obj = value.as_object()?;
    let id = obj.get("id").and_then(id_string).map(PostId::new)?;

    let like_count = match obj.get("likes") {
        Some(Value::Array(likes)) => likes.len() as u64,
        _ => obj.get("likes_count").and_then(Value::as_u64).unwrap_or(0),
    };

    let comments = obj
        .get("comments")
        .and_then(collection)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|c| decode_comment(c, Timestamp::Unknown, NO_COMMENT_TEXT))
                .collect()
        })
        .unwrap_or_default();

    Some(Post {
        id,
        author: decode_author(obj.get("author")),
        content: text_or(obj.get("content"), NO_POST_CONTENT),
        created_at: Timestamp::parse(obj.get("created_at").and_then(Value::as_str)),
        image: resolve_image(obj.get("image"), media_base_url),
        like_count,
        comments,
    })
}

/// Decode one comment object.
///
/// A missing server id yields a `Pending` local id; a missing timestamp
/// yields `fallback_created_at`.
pub fn decode_comment(
    value: &Value,
    fallback_created_at: Timestamp,
    fallback_content: &str,
) -> Option<Comment> {
    let obj = value.as_object()?;

    let id = obj
        .get("id")
        .and_then(id_string)
        .map(CommentId::Confirmed)
        .unwrap_or_else(|| CommentId::Pending(LocalId::new()));

    let created_at = match Timestamp::parse(obj.get("created_at").and_then(Value::as_str)) {
        Timestamp::Unknown => fallback_created_at,
        parsed => parsed,
    };

    Some(Comment {
        id,
        author: decode_author(obj.get("author")),
        content: text_or(obj.get("content"), fallback_content),
        created_at,
    })
}

/// Decode the signed-in user from a "me" response.
pub fn decode_current_user(value: &Value) -> Option<CurrentUser> {
    let obj = value.as_object()?;
    let user = CurrentUser {
        id: obj.get("id").and_then(id_string),
        username: obj
            .get("username")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    };
    if user.id.is_none() && user.username.is_none() {
        return None;
    }
    Some(user)
}

/// Whether any like in a "likes by post" response belongs to `user`.
///
/// Likes that explicitly name a different post are ignored, so a server
/// that disregards the post filter cannot produce a false positive.
pub fn any_like_by(body: &Value, user: &CurrentUser, post_id: &PostId) -> bool {
    let Some(likes) = collection(body) else {
        return false;
    };

    likes.iter().any(|like| {
        let Some(obj) = like.as_object() else {
            return false;
        };
        if let Some(post) = obj.get("post").and_then(id_string) {
            if post != post_id.as_str() {
                return false;
            }
        }
        let (id, username) = match obj.get("user") {
            Some(Value::Object(u)) => (
                u.get("id").and_then(id_string),
                u.get("username").and_then(Value::as_str).map(str::to_string),
            ),
            Some(Value::Number(n)) => (Some(n.to_string()), None),
            Some(Value::String(s)) => (Some(s.clone()), Some(s.clone())),
            _ => (None, None),
        };
        let username =
            username.or_else(|| obj.get("username").and_then(Value::as_str).map(str::to_string));
        user.matches(id.as_deref(), username.as_deref())
    })
}

/// Resolve a post image reference to an absolute URI.
///
/// Relative paths are prefixed with the media base URL.
pub fn resolve_image(raw: Option<&Value>, media_base_url: &str) -> Option<String> {
    let raw = raw?.as_str()?.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return Some(raw.to_string());
    }
    let base = media_base_url.trim_end_matches('/');
    if raw.starts_with('/') {
        Some(format!("{base}{raw}"))
    } else {
        Some(format!("{base}/{raw}"))
    }
}

/// Array body or paginated envelope.
pub(crate) fn collection(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj.get("results").and_then(Value::as_array),
        _ => None,
    }
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn decode_author(value: Option<&Value>) -> Author {
    let name = match value {
        Some(Value::String(s)) => Some(s.as_str()),
        Some(Value::Object(obj)) => obj.get("username").and_then(Value::as_str),
        _ => None,
    };
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => Author::Named(n.to_string()),
        _ => Author::Unknown,
    }
}

fn text_or(value: Option<&Value>, fallback: &str) -> String {
    match value.and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => fallback.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
