//! # Domain Entities
//!
//! Post snapshots and the two mutable state records owned by an
//! interaction store: [`LikeState`] and [`CommentState`].
//!
//! The transition methods here are synchronous and side-effect free; the
//! application layer wraps them around the remote calls.

use serde::{Deserialize, Serialize};

use super::invariants::normalize_comment_text;
use super::value_objects::{Author, CommentId, LikeFailurePolicy, PostId, SkipReason, Timestamp};

/// Read-only post snapshot produced by a feed load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post id.
    pub id: PostId,
    /// Author, or `Unknown`.
    pub author: Author,
    /// Display text (fallback already applied).
    pub content: String,
    /// Creation time.
    pub created_at: Timestamp,
    /// Absolute image URI, if the post has one.
    pub image: Option<String>,
    /// Size of the post's like collection at load time.
    pub like_count: u64,
    /// Embedded comments in server order.
    pub comments: Vec<Comment>,
}

impl Post {
    /// Whether the post exposes an image (and thus a download affordance).
    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// A comment on a post.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Local or server id.
    pub id: CommentId,
    /// Author, or `Unknown`.
    pub author: Author,
    /// Display text (fallback already applied).
    pub content: String,
    /// Creation time.
    pub created_at: Timestamp,
}

/// Like state for one post.
///
/// `has_liked` flips to true optimistically in [`LikeState::begin`]. Until
/// [`LikeState::confirm`] runs the flag is unconfirmed and a failure may
/// revert it, depending on the [`LikeFailurePolicy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LikeState {
    like_count: u64,
    has_liked: bool,
    confirmed: bool,
    in_flight: bool,
}

impl LikeState {
    /// Initial state from the post's like collection size.
    pub fn new(like_count: u64) -> Self {
        Self {
            like_count,
            has_liked: false,
            confirmed: false,
            in_flight: false,
        }
    }

    /// Current like count.
    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    /// Whether the current user has liked (possibly unconfirmed).
    pub fn has_liked(&self) -> bool {
        self.has_liked
    }

    /// Whether the server acknowledged the like.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Whether a like call is outstanding.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Whether a like intent would be dispatched right now.
    pub fn can_like(&self) -> bool {
        !self.has_liked && !self.in_flight
    }

    /// Apply the optimistic update and mark the call in flight.
    pub fn begin(&mut self) -> Result<(), SkipReason> {
        if self.in_flight {
            return Err(SkipReason::LikeInFlight);
        }
        if self.has_liked {
            return Err(SkipReason::AlreadyLiked);
        }
        self.has_liked = true;
        self.like_count = self.like_count.saturating_add(1);
        self.in_flight = true;
        Ok(())
    }

    /// The server accepted the like.
    pub fn confirm(&mut self) {
        self.in_flight = false;
        self.confirmed = true;
    }

    /// The server call failed.
    pub fn fail(&mut self, policy: LikeFailurePolicy) {
        self.in_flight = false;
        if policy == LikeFailurePolicy::Revert && self.has_liked && !self.confirmed {
            self.has_liked = false;
            self.like_count = self.like_count.saturating_sub(1);
        }
    }

    /// Take the like count from a fresh snapshot of the post.
    ///
    /// An outstanding call keeps the local count, since the snapshot may or
    /// may not include it. A set flag is never lowered.
    pub fn refresh(&mut self, like_count: u64) {
        if self.in_flight {
            return;
        }
        self.like_count = if self.has_liked {
            like_count.max(1)
        } else {
            like_count
        };
    }

    /// Apply the remote "did I like this" answer.
    ///
    /// Never lowers an existing flag and never races an outstanding call.
    pub fn hydrate(&mut self, liked: bool) -> Result<(), SkipReason> {
        if self.in_flight || self.has_liked {
            return Err(SkipReason::StaleHydration);
        }
        if liked {
            self.has_liked = true;
            self.confirmed = true;
        }
        Ok(())
    }
}

/// Comment list, draft buffer and submission guard for one post.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommentState {
    comments: Vec<Comment>,
    draft_text: String,
    is_submitting: bool,
}

impl CommentState {
    /// Start from the comments embedded in the post snapshot.
    pub fn new(comments: Vec<Comment>) -> Self {
        Self {
            comments,
            draft_text: String::new(),
            is_submitting: false,
        }
    }

    /// Comments in arrival order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Current draft.
    pub fn draft_text(&self) -> &str {
        &self.draft_text
    }

    /// Whether a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Replace the draft buffer.
    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft_text = text.into();
    }

    /// Check the preconditions and raise the in-flight guard.
    ///
    /// Returns the trimmed text to send.
    pub fn begin_submit(&mut self, text: &str) -> Result<String, SkipReason> {
        if self.is_submitting {
            return Err(SkipReason::SubmissionInFlight);
        }
        let content = normalize_comment_text(text).ok_or(SkipReason::EmptyComment)?;
        self.is_submitting = true;
        Ok(content)
    }

    /// Replace the list with the server's listing.
    ///
    /// Pending comments are dropped; the listing carries their confirmed
    /// form. The draft and the submission guard are left alone.
    pub fn refresh(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
    }

    /// The server created the comment.
    ///
    /// A confirmed comment already delivered by a refresh is not appended
    /// twice.
    pub fn complete(&mut self, comment: Comment) {
        let listed = comment.id.is_confirmed() && self.comments.iter().any(|c| c.id == comment.id);
        if !listed {
            self.comments.push(comment);
        }
        self.draft_text.clear();
        self.is_submitting = false;
    }

    /// The server call failed; the draft is kept for a retry.
    pub fn fail(&mut self) {
        self.is_submitting = false;
    }
}
