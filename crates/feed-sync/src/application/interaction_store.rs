//! # Interaction State Store
//!
//! One store per post. Owns the like state, the comment state and the
//! download guard, and runs every user intent against the gateway.
//!
//! Likes are optimistic: the flag and count move before the call. Comments
//! are pessimistic: nothing is appended until the server answers. Each
//! intent kind has its own in-flight guard, so a like and a comment can be
//! outstanding at the same time but never two of the same kind.
//!
//! State sits behind a `parking_lot` lock that is only taken between
//! awaits, so intents on the same store can be polled concurrently.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    any_like_by, decode_comment, invariant_comments_append_only,
    invariant_confirmed_like_monotonic, invariant_like_count_step, Author, Comment, CommentId,
    CommentState, CurrentUser, DownloadResult, FeedError, IntentOutcome, LikeFailurePolicy,
    LikeState, LocalId, Post, PostId, SkipReason, Timestamp,
};
use crate::ports::{ApiGateway, ApiRequest, AssetSink, CredentialProvider, Endpoint, InteractionApi};

/// Collaborators shared by every store of a feed.
#[derive(Clone)]
pub struct StoreDeps {
    /// Remote API.
    pub gateway: Arc<dyn ApiGateway>,
    /// Bearer credential source.
    pub credentials: Arc<dyn CredentialProvider>,
    /// Where downloaded images go.
    pub assets: Arc<dyn AssetSink>,
}

/// Render snapshot of one post and its interaction state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostView {
    /// Immutable snapshot from the feed load.
    pub post: Post,
    /// Current like count.
    pub like_count: u64,
    /// Whether the current user has liked.
    pub has_liked: bool,
    /// Whether the like control should be enabled.
    pub can_like: bool,
    /// Comments in arrival order.
    pub comments: Vec<Comment>,
    /// Draft buffer.
    pub draft_text: String,
    /// Whether a comment submission is outstanding.
    pub is_submitting: bool,
    /// Whether a download affordance exists.
    pub can_download: bool,
    /// Whether a download is outstanding.
    pub is_downloading: bool,
    /// Last transient error, until dismissed or superseded by a success.
    pub last_error: Option<FeedError>,
}

#[derive(Debug)]
struct StoreState {
    post: Post,
    like: LikeState,
    comments: CommentState,
    is_downloading: bool,
    last_error: Option<FeedError>,
}

impl StoreState {
    /// Keep a failure for display unless it must stay silent.
    fn record_failure(&mut self, err: &FeedError) {
        if !err.is_silent() {
            self.last_error = Some(err.clone());
        }
    }
}

/// Interaction State Store for one post.
///
/// The store outlives feed reloads: the coordinator hands it each fresh
/// snapshot of its post through [`InteractionStore::refresh`], so in-flight
/// guards survive a reload.
pub struct InteractionStore {
    id: PostId,
    deps: StoreDeps,
    like_failure_policy: LikeFailurePolicy,
    state: RwLock<StoreState>,
}

impl InteractionStore {
    /// Build a store from a post snapshot.
    pub fn new(post: Post, deps: StoreDeps, like_failure_policy: LikeFailurePolicy) -> Self {
        let state = StoreState {
            like: LikeState::new(post.like_count),
            comments: CommentState::new(post.comments.clone()),
            is_downloading: false,
            last_error: None,
            post,
        };
        Self {
            id: state.post.id.clone(),
            deps,
            like_failure_policy,
            state: RwLock::new(state),
        }
    }

    /// Post id.
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// The latest snapshot of the post.
    pub fn post(&self) -> Post {
        self.state.read().post.clone()
    }

    /// Adopt a newer snapshot of the same post.
    ///
    /// Like count and comment list follow the snapshot. Outstanding calls
    /// and the draft are kept.
    pub fn refresh(&self, post: Post) {
        if post.id != self.id {
            warn!(post_id = %self.id, other = %post.id, "[feed-sync] Ignoring snapshot of another post");
            return;
        }
        let mut state = self.state.write();
        state.like.refresh(post.like_count);
        state.comments.refresh(post.comments.clone());
        debug!(
            post_id = %self.id,
            like_in_flight = state.like.in_flight(),
            submitting = state.comments.is_submitting(),
            "[feed-sync] Store refreshed"
        );
        state.post = post;
    }

    /// Current draft buffer.
    pub fn draft_text(&self) -> String {
        self.state.read().comments.draft_text().to_string()
    }

    /// Clear the transient error.
    pub fn dismiss_error(&self) {
        self.state.write().last_error = None;
    }

    /// Like the post.
    ///
    /// Refused silently when already liked or while a like is in flight.
    /// On failure the optimistic update is handled per the configured
    /// [`LikeFailurePolicy`].
    pub async fn like(&self) -> IntentOutcome<()> {
        let begun = {
            let mut state = self.state.write();
            let before = state.like.clone();
            let begun = state.like.begin();
            debug_assert!(invariant_like_count_step(&before, &state.like));
            begun
        };
        if let Err(reason) = begun {
            debug!(post_id = %self.id, %reason, "[feed-sync] Like intent refused");
            return IntentOutcome::Skipped(reason);
        }

        let request = ApiRequest::new(
            Endpoint::CreateLike {
                post_id: self.id.clone(),
            },
            self.deps.credentials.get(),
        );
        let result = self.deps.gateway.call(request).await;

        let mut state = self.state.write();
        match result {
            Ok(_) => {
                state.like.confirm();
                state.last_error = None;
                info!(
                    post_id = %self.id,
                    like_count = state.like.like_count(),
                    "[feed-sync] Like confirmed"
                );
                IntentOutcome::Applied(())
            }
            Err(err) => {
                let before = state.like.clone();
                let err = FeedError::from(err);
                state.like.fail(self.like_failure_policy);
                debug_assert!(invariant_confirmed_like_monotonic(&before, &state.like));
                debug_assert!(invariant_like_count_step(&before, &state.like));
                state.record_failure(&err);
                warn!(
                    post_id = %self.id,
                    policy = ?self.like_failure_policy,
                    error = %err,
                    "[feed-sync] Like failed"
                );
                IntentOutcome::Failed(err)
            }
        }
    }

    /// Replace the draft buffer.
    pub fn set_draft(&self, text: &str) {
        self.state.write().comments.set_draft(text);
    }

    /// Submit the current draft.
    pub async fn submit_draft(&self) -> IntentOutcome<()> {
        let draft = self.draft_text();
        self.submit_comment(&draft).await
    }

    /// Submit a comment.
    ///
    /// Refused silently for whitespace-only text or while a submission is
    /// outstanding. Nothing is appended before the server confirms.
    pub async fn submit_comment(&self, text: &str) -> IntentOutcome<()> {
        let begun = self.state.write().comments.begin_submit(text);
        let content = match begun {
            Ok(content) => content,
            Err(reason) => {
                debug!(post_id = %self.id, %reason, "[feed-sync] Comment intent refused");
                return IntentOutcome::Skipped(reason);
            }
        };

        let request = ApiRequest::new(
            Endpoint::CreateComment {
                post_id: self.id.clone(),
                content: content.clone(),
            },
            self.deps.credentials.get(),
        );
        let result = self.deps.gateway.call(request).await;

        let mut state = self.state.write();
        match result {
            Ok(body) => {
                let submitted_at = Timestamp::At(Utc::now());
                let comment = decode_comment(&body, submitted_at, &content).unwrap_or_else(|| {
                    Comment {
                        id: CommentId::Pending(LocalId::new()),
                        author: Author::Unknown,
                        content: content.clone(),
                        created_at: submitted_at,
                    }
                });
                if !comment.id.is_confirmed() {
                    warn!(post_id = %self.id, "[feed-sync] Server returned a comment without an id");
                }

                let before = state.comments.comments().to_vec();
                state.comments.complete(comment);
                debug_assert!(invariant_comments_append_only(
                    &before,
                    state.comments.comments()
                ));
                state.last_error = None;
                info!(
                    post_id = %self.id,
                    comments = state.comments.comments().len(),
                    "[feed-sync] Comment added"
                );
                IntentOutcome::Applied(())
            }
            Err(err) => {
                let err = FeedError::from(err);
                state.comments.fail();
                state.record_failure(&err);
                warn!(post_id = %self.id, error = %err, "[feed-sync] Comment failed");
                IntentOutcome::Failed(err)
            }
        }
    }

    /// Populate `has_liked` from the remote likes of this post.
    ///
    /// Best-effort: a failure leaves the flag as it was and is not recorded
    /// as a transient error.
    pub async fn hydrate_like_state(&self, current_user: Option<&CurrentUser>) -> IntentOutcome<bool> {
        let Some(token) = self.deps.credentials.get() else {
            return IntentOutcome::Skipped(SkipReason::NoCredential);
        };
        let Some(user) = current_user else {
            return IntentOutcome::Skipped(SkipReason::UnknownUser);
        };
        if !self.state.read().like.can_like() {
            return IntentOutcome::Skipped(SkipReason::StaleHydration);
        }

        let request = ApiRequest::new(
            Endpoint::QueryLikes {
                post_id: self.id.clone(),
            },
            Some(token),
        );
        match self.deps.gateway.call(request).await {
            Ok(body) => {
                let liked = any_like_by(&body, user, &self.id);
                let applied = self.state.write().like.hydrate(liked);
                match applied {
                    Ok(()) => {
                        debug!(post_id = %self.id, liked, "[feed-sync] Like state hydrated");
                        IntentOutcome::Applied(liked)
                    }
                    Err(reason) => IntentOutcome::Skipped(reason),
                }
            }
            Err(err) => {
                let err = FeedError::from(err);
                debug!(post_id = %self.id, error = %err, "[feed-sync] Like hydration failed");
                IntentOutcome::Failed(err)
            }
        }
    }

    /// Download affordance, present only when the post has an image.
    pub fn download_affordance(&self) -> Option<DownloadAffordance<'_>> {
        let uri = self.state.read().post.image.clone()?;
        Some(DownloadAffordance { store: self, uri })
    }

    /// Render snapshot.
    pub fn view(&self) -> PostView {
        let state = self.state.read();
        PostView {
            post: state.post.clone(),
            like_count: state.like.like_count(),
            has_liked: state.like.has_liked(),
            can_like: state.like.can_like(),
            comments: state.comments.comments().to_vec(),
            draft_text: state.comments.draft_text().to_string(),
            is_submitting: state.comments.is_submitting(),
            can_download: state.post.has_image(),
            is_downloading: state.is_downloading,
            last_error: state.last_error.clone(),
        }
    }

    async fn download_image(&self, uri: &str) -> IntentOutcome<DownloadResult> {
        {
            let mut state = self.state.write();
            if state.is_downloading {
                debug!(post_id = %self.id, "[feed-sync] Download intent refused");
                return IntentOutcome::Skipped(SkipReason::DownloadInFlight);
            }
            state.is_downloading = true;
        }

        let outcome = self.fetch_and_save(uri).await;

        let mut state = self.state.write();
        state.is_downloading = false;
        match &outcome {
            IntentOutcome::Failed(err) => state.record_failure(err),
            IntentOutcome::Applied(_) => state.last_error = None,
            IntentOutcome::Skipped(_) => {}
        }
        outcome
    }

    async fn fetch_and_save(&self, uri: &str) -> IntentOutcome<DownloadResult> {
        let file_name = asset_file_name(uri, &self.id);

        let failure = match self.deps.gateway.fetch_asset(uri).await {
            Ok(bytes) => match self.deps.assets.save(&file_name, bytes).await {
                Ok(saved) => {
                    info!(post_id = %self.id, location = %saved.location, "[feed-sync] Image saved");
                    return IntentOutcome::Applied(DownloadResult::Saved(saved));
                }
                Err(err) => err,
            },
            Err(err) => FeedError::from(err),
        };

        warn!(
            post_id = %self.id,
            error = %failure,
            "[feed-sync] Download failed, opening image externally"
        );
        match self.deps.assets.open_external(uri).await {
            Ok(()) => IntentOutcome::Applied(DownloadResult::OpenedExternally {
                uri: uri.to_string(),
            }),
            Err(err) => IntentOutcome::Failed(err),
        }
    }
}

/// Download control for a post that carries an image.
///
/// Only obtainable through [`InteractionStore::download_affordance`].
pub struct DownloadAffordance<'a> {
    store: &'a InteractionStore,
    uri: String,
}

impl DownloadAffordance<'_> {
    /// Image URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Whether a download is outstanding.
    pub fn is_downloading(&self) -> bool {
        self.store.state.read().is_downloading
    }

    /// Fetch the image and save it, falling back to an external viewer.
    pub async fn download(&self) -> IntentOutcome<DownloadResult> {
        self.store.download_image(&self.uri).await
    }
}

#[async_trait]
impl InteractionApi for InteractionStore {
    async fn like(&self) -> IntentOutcome<()> {
        InteractionStore::like(self).await
    }

    async fn submit_comment(&self, text: &str) -> IntentOutcome<()> {
        InteractionStore::submit_comment(self, text).await
    }

    fn set_draft(&self, text: &str) {
        InteractionStore::set_draft(self, text);
    }

    fn view(&self) -> PostView {
        InteractionStore::view(self)
    }
}

/// File name for a downloaded image: the last path segment of the URI.
fn asset_file_name(uri: &str, post_id: &PostId) -> String {
    let without_scheme = uri.split_once("://").map_or(uri, |(_, rest)| rest);
    let path = without_scheme
        .split_once('/')
        .map_or("", |(_, path)| path)
        .split(['?', '#'])
        .next()
        .unwrap_or("");
    match path.rsplit('/').next() {
        Some(segment) if !segment.is_empty() => segment.to_string(),
        _ => format!("post-{post_id}.jpg"),
    }
}
