//! # Feed Coordinator
//!
//! Loads the feed, owns one [`InteractionStore`] per post and keeps the
//! list phase.
//!
//! ## Overlapping loads
//!
//! Every `load()` takes a ticket from a monotonically increasing counter.
//! A result is applied only when its ticket is newer than the last applied
//! one, so a slow call that resolves after a newer call is discarded
//! whether it succeeded or failed.
//!
//! ## Reloads
//!
//! A post that survives a reload keeps its store. The store adopts the new
//! snapshot, so a like or comment still outstanding stays guarded.

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::interaction_store::{InteractionStore, StoreDeps};
use crate::config::FeedClientConfig;
use crate::domain::{
    decode_current_user, decode_posts, CurrentUser, FeedError, IntentOutcome, LikeFailurePolicy,
    Post, PostId, Route,
};
use crate::ports::{ApiRequest, Endpoint, FeedApi, Navigator};

/// Phase of the feed list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FeedPhase {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A load is outstanding.
    Loading,
    /// The last applied load succeeded.
    Loaded,
    /// The last applied load failed; earlier posts are still shown.
    Errored {
        /// What went wrong.
        error: FeedError,
        /// Whether `retry()` can help.
        retryable: bool,
    },
    /// No credential; the user was sent to sign up.
    SignUpRequired,
}

/// What happened to one load call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the post list.
    Applied {
        /// Posts now shown.
        post_count: usize,
    },
    /// A newer load had already been applied; the result was dropped.
    Superseded,
}

/// Report of one `load()` / `retry()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadReport {
    /// Ticket the call was issued with.
    pub ticket: u64,
    /// What happened to its result.
    pub outcome: LoadOutcome,
}

impl LoadReport {
    /// Whether the result was applied.
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Applied { .. })
    }
}

#[derive(Default)]
struct FeedState {
    phase: FeedPhase,
    stores: Vec<Arc<InteractionStore>>,
    applied_ticket: u64,
    current_user: Option<CurrentUser>,
}

/// Feed Coordinator.
pub struct FeedCoordinator {
    deps: StoreDeps,
    navigator: Arc<dyn Navigator>,
    media_base_url: String,
    like_failure_policy: LikeFailurePolicy,
    hydrate_likes: bool,
    next_ticket: AtomicU64,
    state: RwLock<FeedState>,
}

impl FeedCoordinator {
    /// Create an idle coordinator.
    pub fn new(config: &FeedClientConfig, deps: StoreDeps, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            deps,
            navigator,
            media_base_url: config.media_base_url.clone(),
            like_failure_policy: config.like_failure_policy,
            hydrate_likes: config.hydrate_likes,
            next_ticket: AtomicU64::new(0),
            state: RwLock::new(FeedState::default()),
        }
    }

    /// Fetch the feed.
    ///
    /// Without a credential no call is made: the phase becomes
    /// [`FeedPhase::SignUpRequired`], the navigator is sent to sign-up and
    /// loads still in flight are invalidated.
    /// A failed fetch that is still the newest result returns the error and
    /// keeps the previous posts.
    pub async fn load(&self) -> Result<LoadReport, FeedError> {
        let Some(token) = self.deps.credentials.get() else {
            let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut state = self.state.write();
                state.applied_ticket = ticket;
                state.phase = FeedPhase::SignUpRequired;
            }
            warn!(ticket, "[feed-sync] No credential, redirecting to sign-up");
            self.navigator.navigate(Route::SignUp);
            return Err(FeedError::NoCredential);
        };

        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().phase = FeedPhase::Loading;
        debug!(ticket, "[feed-sync] Loading feed");

        let result = self
            .deps
            .gateway
            .call(ApiRequest::new(Endpoint::FetchPosts, Some(token)))
            .await
            .map_err(FeedError::from)
            .and_then(|body| decode_posts(&body, &self.media_base_url));

        let stores = {
            let mut state = self.state.write();
            if ticket <= state.applied_ticket {
                debug!(
                    ticket,
                    applied = state.applied_ticket,
                    "[feed-sync] Discarding superseded feed result"
                );
                return Ok(LoadReport {
                    ticket,
                    outcome: LoadOutcome::Superseded,
                });
            }
            state.applied_ticket = ticket;

            match result {
                Ok(posts) => {
                    let stores = self.build_stores(posts, &state.stores);
                    info!(ticket, posts = stores.len(), "[feed-sync] Feed loaded");
                    state.stores = stores.clone();
                    state.phase = FeedPhase::Loaded;
                    stores
                }
                Err(err) => {
                    warn!(
                        ticket,
                        error = %err,
                        kept = state.stores.len(),
                        "[feed-sync] Feed load failed"
                    );
                    state.phase = FeedPhase::Errored {
                        retryable: err.is_retryable(),
                        error: err.clone(),
                    };
                    return Err(err);
                }
            }
        };

        if self.hydrate_likes && !stores.is_empty() {
            self.hydrate(&stores).await;
        }

        Ok(LoadReport {
            ticket,
            outcome: LoadOutcome::Applied {
                post_count: stores.len(),
            },
        })
    }

    /// Re-run the fetch from any phase.
    pub async fn retry(&self) -> Result<LoadReport, FeedError> {
        info!(phase = ?self.phase(), "[feed-sync] Retrying feed load");
        self.load().await
    }

    /// Drop every store and return to `Idle`.
    ///
    /// Loads still in flight are invalidated.
    pub fn reset(&self) {
        let ticket = self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.write();
        *state = FeedState {
            applied_ticket: ticket,
            ..FeedState::default()
        };
        debug!(ticket, "[feed-sync] Feed reset");
    }

    /// Current list phase.
    pub fn phase(&self) -> FeedPhase {
        self.state.read().phase.clone()
    }

    /// Store for one post.
    pub fn store(&self, id: &PostId) -> Option<Arc<InteractionStore>> {
        self.state
            .read()
            .stores
            .iter()
            .find(|store| store.id() == id)
            .cloned()
    }

    /// Every store, in server order.
    pub fn stores(&self) -> Vec<Arc<InteractionStore>> {
        self.state.read().stores.clone()
    }

    /// The signed-in user, once resolved.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.state.read().current_user.clone()
    }

    fn build_stores(
        &self,
        posts: Vec<Post>,
        previous: &[Arc<InteractionStore>],
    ) -> Vec<Arc<InteractionStore>> {
        posts
            .into_iter()
            .map(|post| match previous.iter().find(|old| old.id() == &post.id) {
                Some(store) => {
                    store.refresh(post);
                    store.clone()
                }
                None => Arc::new(InteractionStore::new(
                    post,
                    self.deps.clone(),
                    self.like_failure_policy,
                )),
            })
            .collect()
    }

    async fn hydrate(&self, stores: &[Arc<InteractionStore>]) {
        let user = match self.current_user() {
            Some(user) => Some(user),
            None => self.resolve_current_user().await,
        };
        if user.is_none() {
            debug!("[feed-sync] Current user unknown, skipping like hydration");
            return;
        }

        let outcomes = join_all(
            stores
                .iter()
                .map(|store| store.hydrate_like_state(user.as_ref())),
        )
        .await;
        let liked = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, IntentOutcome::Applied(true)))
            .count();
        debug!(stores = stores.len(), liked, "[feed-sync] Like state hydrated");
    }

    async fn resolve_current_user(&self) -> Option<CurrentUser> {
        let request = ApiRequest::new(Endpoint::CurrentUser, self.deps.credentials.get());
        match self.deps.gateway.call(request).await {
            Ok(body) => {
                let user = decode_current_user(&body);
                if user.is_some() {
                    self.state.write().current_user = user.clone();
                }
                user
            }
            Err(err) => {
                debug!(error = %err, "[feed-sync] Could not resolve current user");
                None
            }
        }
    }
}

#[async_trait]
impl FeedApi for FeedCoordinator {
    async fn load(&self) -> Result<LoadReport, FeedError> {
        FeedCoordinator::load(self).await
    }

    async fn retry(&self) -> Result<LoadReport, FeedError> {
        FeedCoordinator::retry(self).await
    }

    fn phase(&self) -> FeedPhase {
        FeedCoordinator::phase(self)
    }

    fn posts(&self) -> Vec<Post> {
        self.state
            .read()
            .stores
            .iter()
            .map(|store| store.post())
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.state.read().stores.is_empty()
    }
}
