//! # Domain Value Objects
//!
//! Immutable value types for feed synchronization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::errors::FeedError;
use super::invariants::{UNKNOWN_AUTHOR, UNKNOWN_DATE};

/// Opaque post identifier, unique within one feed load.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PostId(String);

impl PostId {
    /// Create a post id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque bearer credential.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Expose the secret for the transport adapter.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

/// Author of a post or comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    /// A username reported by the server.
    Named(String),
    /// Missing or malformed author data.
    Unknown,
}

impl Author {
    /// Display name, falling back to the "Unknown" sentinel.
    pub fn display_name(&self) -> &str {
        match self {
            Author::Named(name) => name,
            Author::Unknown => UNKNOWN_AUTHOR,
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Creation time of a post or comment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timestamp {
    /// A parsed calendar time.
    At(DateTime<Utc>),
    /// Missing or unparseable.
    Unknown,
}

impl Timestamp {
    /// Parse an RFC 3339 string, degrading to `Unknown`.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| Timestamp::At(dt.with_timezone(&Utc)))
            .unwrap_or(Timestamp::Unknown)
    }

    /// Calendar date for display, or the "Unknown date" sentinel.
    pub fn display_date(&self) -> String {
        match self {
            Timestamp::At(dt) => dt.format("%b %-d, %Y").to_string(),
            Timestamp::Unknown => UNKNOWN_DATE.to_string(),
        }
    }
}

/// Locally generated id for a comment the server did not identify.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalId(Uuid);

impl LocalId {
    /// Generate a fresh local id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

/// Comment identity: either a local placeholder or the server's id.
///
/// A `Pending` id is never sent to the server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentId {
    /// No server id known yet.
    Pending(LocalId),
    /// Assigned by the server.
    Confirmed(String),
}

impl CommentId {
    /// Whether the server has assigned this id.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, CommentId::Confirmed(_))
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentId::Pending(local) => local.fmt(f),
            CommentId::Confirmed(id) => f.write_str(id),
        }
    }
}

/// Identity of the signed-in user, used to attribute likes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Server-side user id, if reported.
    pub id: Option<String>,
    /// Username, if reported.
    pub username: Option<String>,
}

impl CurrentUser {
    /// Whether either identifier matches.
    pub fn matches(&self, id: Option<&str>, username: Option<&str>) -> bool {
        let id_match = matches!((self.id.as_deref(), id), (Some(a), Some(b)) if a == b);
        let name_match =
            matches!((self.username.as_deref(), username), (Some(a), Some(b)) if a == b);
        id_match || name_match
    }
}

/// Navigation intent emitted towards the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// The feed view.
    Feed,
    /// Login screen.
    Login,
    /// Sign-up screen.
    SignUp,
}

/// What to do with an optimistic like when the server rejects it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LikeFailurePolicy {
    /// Undo the optimistic flag and count.
    #[default]
    Revert,
    /// Leave the optimistic state in place.
    Keep,
}

impl std::str::FromStr for LikeFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "revert" => Ok(LikeFailurePolicy::Revert),
            "keep" => Ok(LikeFailurePolicy::Keep),
            other => Err(format!("unknown like failure policy: {other}")),
        }
    }
}

/// Why an intent was silently refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// `has_liked` is already true.
    AlreadyLiked,
    /// A like call is outstanding.
    LikeInFlight,
    /// Comment text is empty after trimming.
    EmptyComment,
    /// Post content is empty after trimming.
    EmptyPost,
    /// A comment or post submission is outstanding.
    SubmissionInFlight,
    /// A download of this image is outstanding.
    DownloadInFlight,
    /// No credential, so there is nothing to hydrate.
    NoCredential,
    /// The current user could not be resolved.
    UnknownUser,
    /// A hydration result arrived after local state already moved on.
    StaleHydration,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::AlreadyLiked => "already liked",
            SkipReason::LikeInFlight => "like already in flight",
            SkipReason::EmptyComment => "comment text is empty",
            SkipReason::EmptyPost => "post content is empty",
            SkipReason::SubmissionInFlight => "submission already in flight",
            SkipReason::DownloadInFlight => "download already in flight",
            SkipReason::NoCredential => "no credential",
            SkipReason::UnknownUser => "current user unknown",
            SkipReason::StaleHydration => "hydration result is stale",
        };
        f.write_str(text)
    }
}

impl From<SkipReason> for FeedError {
    fn from(reason: SkipReason) -> Self {
        FeedError::PreconditionViolation(reason.to_string())
    }
}

/// Result of dispatching a user intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntentOutcome<T> {
    /// The remote call succeeded and local state reflects it.
    Applied(T),
    /// The precondition did not hold; nothing was dispatched.
    Skipped(SkipReason),
    /// The remote call failed; the error is also kept as a transient error.
    Failed(FeedError),
}

impl<T> IntentOutcome<T> {
    /// Whether the intent reached the server successfully.
    pub fn is_applied(&self) -> bool {
        matches!(self, IntentOutcome::Applied(_))
    }

    /// Whether the intent was silently refused.
    pub fn is_skipped(&self) -> bool {
        matches!(self, IntentOutcome::Skipped(_))
    }

    /// Convert into a `Result`, mapping skips to precondition violations.
    pub fn into_result(self) -> Result<T, FeedError> {
        match self {
            IntentOutcome::Applied(value) => Ok(value),
            IntentOutcome::Skipped(reason) => Err(reason.into()),
            IntentOutcome::Failed(err) => Err(err),
        }
    }
}

/// A downloaded image written to a local artifact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAsset {
    /// File name used for the artifact.
    pub file_name: String,
    /// Where the artifact now lives (path or sink-specific handle).
    pub location: String,
    /// Size in bytes.
    pub size: usize,
}

/// How a download intent was fulfilled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DownloadResult {
    /// Bytes were fetched and materialized locally.
    Saved(SavedAsset),
    /// The fetch failed; the resource was handed to an external viewer.
    OpenedExternally {
        /// The image URI that was opened.
        uri: String,
    },
}
