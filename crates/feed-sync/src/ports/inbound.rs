//! # Inbound Ports
//!
//! API traits the presentation layer drives.

use async_trait::async_trait;

use crate::application::{FeedPhase, LoadReport, PostView};
use crate::domain::{FeedError, IntentOutcome, Post, PostId};

/// Feed list API - inbound port.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// Fetch the feed. Fails closed without a credential.
    async fn load(&self) -> Result<LoadReport, FeedError>;

    /// Manual retry after an error (or a refresh after a load).
    async fn retry(&self) -> Result<LoadReport, FeedError>;

    /// Current list phase.
    fn phase(&self) -> FeedPhase;

    /// Post snapshots of the last applied load, in server order.
    fn posts(&self) -> Vec<Post>;

    /// Whether the last applied load returned no posts.
    fn is_empty(&self) -> bool;

    /// Ids of the posts currently shown.
    fn post_ids(&self) -> Vec<PostId> {
        self.posts().into_iter().map(|p| p.id).collect()
    }
}

/// Per-post interaction API - inbound port.
#[async_trait]
pub trait InteractionApi: Send + Sync {
    /// Like the post (optimistic).
    async fn like(&self) -> IntentOutcome<()>;

    /// Submit a comment (pessimistic).
    async fn submit_comment(&self, text: &str) -> IntentOutcome<()>;

    /// Replace the draft buffer.
    fn set_draft(&self, text: &str);

    /// Snapshot for rendering.
    fn view(&self) -> PostView;
}
