//! # Domain Invariants
//!
//! Fallback values and rules that must always hold for interaction state.

use super::entities::{Comment, LikeState};

/// Author shown when the server sends no usable username.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Post body shown when content is missing.
pub const NO_POST_CONTENT: &str = "[No content]";

/// Comment body shown when content is missing.
pub const NO_COMMENT_TEXT: &str = "[No text]";

/// Date shown when the creation timestamp is missing or unparseable.
pub const UNKNOWN_DATE: &str = "Unknown date";

/// Normalize user-entered comment text.
///
/// Returns `None` when nothing but whitespace was entered.
pub fn normalize_comment_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Invariant: a confirmed like is never taken back.
///
/// There is no unlike path, so once the server accepted the like the flag
/// stays set for the lifetime of the store.
pub fn invariant_confirmed_like_monotonic(before: &LikeState, after: &LikeState) -> bool {
    !before.is_confirmed() || (after.has_liked() && after.is_confirmed())
}

/// Invariant: a like intent moves the count by at most the optimistic step.
///
/// Snapshot refreshes are exempt; they take the server's count.
pub fn invariant_like_count_step(before: &LikeState, after: &LikeState) -> bool {
    before.like_count().abs_diff(after.like_count()) <= 1
}

/// Invariant: comments are append-only.
///
/// `after` must start with every comment of `before`, in the same order.
pub fn invariant_comments_append_only(before: &[Comment], after: &[Comment]) -> bool {
    after.len() >= before.len()
        && before
            .iter()
            .zip(after.iter())
            .all(|(a, b)| a.id == b.id)
}
