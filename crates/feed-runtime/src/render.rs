//! Plain-text rendering of feed state.

use feed_sync::{DownloadResult, FeedPhase, IntentOutcome, PostView};

/// Shown when a loaded feed has no posts.
pub const EMPTY_FEED: &str = "No posts yet.";

/// One post card.
pub fn render_post(view: &PostView) -> String {
    let post = &view.post;
    let mut out = format!(
        "#{} {} ({})\n  {}\n",
        post.id,
        post.author,
        post.created_at.display_date(),
        post.content
    );
    if let Some(image) = &post.image {
        out.push_str(&format!("  [image] {image}\n"));
    }
    out.push_str(&format!(
        "  {} {} likes, {} comments\n",
        if view.has_liked { "♥" } else { "♡" },
        view.like_count,
        view.comments.len()
    ));
    for comment in &view.comments {
        out.push_str(&format!("    {}: {}\n", comment.author, comment.content));
    }
    if let Some(err) = &view.last_error {
        out.push_str(&format!("  ! {err}\n"));
    }
    out
}

/// The whole list, or its phase when there is nothing to show.
pub fn render_feed(phase: &FeedPhase, views: &[PostView]) -> String {
    let mut out = String::new();
    if let FeedPhase::Errored { error, retryable } = phase {
        out.push_str(&format!("Failed to load feed: {error}"));
        if *retryable {
            out.push_str(" (retry to reload)");
        }
        out.push('\n');
    }
    if views.is_empty() {
        if *phase == FeedPhase::Loaded {
            out.push_str(EMPTY_FEED);
            out.push('\n');
        }
        return out;
    }
    for view in views {
        out.push_str(&render_post(view));
    }
    out
}

/// One line for an intent result.
pub fn render_outcome<T>(action: &str, outcome: &IntentOutcome<T>) -> String {
    match outcome {
        IntentOutcome::Applied(_) => format!("{action}: done"),
        IntentOutcome::Skipped(reason) => format!("{action}: skipped ({reason})"),
        IntentOutcome::Failed(err) => format!("{action}: failed ({err})"),
    }
}

/// One line for a download result.
pub fn render_download(result: &DownloadResult) -> String {
    match result {
        DownloadResult::Saved(saved) => {
            format!("saved {} ({} bytes) to {}", saved.file_name, saved.size, saved.location)
        }
        DownloadResult::OpenedExternally { uri } => format!("could not save, open {uri}"),
    }
}
