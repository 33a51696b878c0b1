//! # Post Composer and Editor
//!
//! Text-only creation and editing of the user's own posts. Both are
//! pessimistic and guarded by an `is_submitting` flag, like comments.

use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    decode_post, normalize_comment_text, AuthToken, FeedError, Post, PostId, Route, SkipReason,
};
use crate::ports::{ApiGateway, ApiRequest, CredentialProvider, Endpoint, Navigator};

/// Shown when creating a post fails.
pub const FAILED_TO_CREATE_POST: &str = "Failed to create post";

/// Shown when the post to edit cannot be fetched.
pub const FAILED_TO_LOAD_POST: &str = "Failed to load post";

/// Shown when saving an edited post fails.
pub const FAILED_TO_UPDATE_POST: &str = "Failed to update post";

fn require_credential(
    credentials: &dyn CredentialProvider,
    navigator: &dyn Navigator,
) -> Result<AuthToken, FeedError> {
    credentials.get().ok_or_else(|| {
        warn!("[feed-sync] No credential, redirecting to login");
        navigator.navigate(Route::Login);
        FeedError::NoCredential
    })
}

fn decode_saved_post(body: &Value, media_base_url: &str) -> Result<Post, FeedError> {
    decode_post(body, media_base_url)
        .ok_or_else(|| FeedError::MalformedResponse("saved post has no id".to_string()))
}

#[derive(Debug, Default)]
struct ComposerState {
    is_submitting: bool,
    last_error: Option<String>,
}

/// New-post form.
pub struct PostComposer {
    gateway: Arc<dyn ApiGateway>,
    credentials: Arc<dyn CredentialProvider>,
    navigator: Arc<dyn Navigator>,
    media_base_url: String,
    state: RwLock<ComposerState>,
}

impl PostComposer {
    /// Create a composer.
    pub fn new(
        gateway: Arc<dyn ApiGateway>,
        credentials: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
        media_base_url: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            navigator,
            media_base_url: media_base_url.into(),
            state: RwLock::new(ComposerState::default()),
        }
    }

    /// Whether a create call is outstanding.
    pub fn is_submitting(&self) -> bool {
        self.state.read().is_submitting
    }

    /// Message of the last failure.
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Publish a post and navigate back to the feed.
    ///
    /// Empty content and a second call while one is outstanding are
    /// refused with [`FeedError::PreconditionViolation`].
    pub async fn create(&self, content: &str) -> Result<Post, FeedError> {
        let token = require_credential(self.credentials.as_ref(), self.navigator.as_ref())?;
        let content = normalize_comment_text(content).ok_or(SkipReason::EmptyPost)?;
        {
            let mut state = self.state.write();
            if state.is_submitting {
                debug!("[feed-sync] Post create refused, already submitting");
                return Err(SkipReason::SubmissionInFlight.into());
            }
            state.is_submitting = true;
        }

        let result = self
            .gateway
            .call(ApiRequest::new(Endpoint::CreatePost { content }, Some(token)))
            .await
            .map_err(FeedError::from)
            .and_then(|body| decode_saved_post(&body, &self.media_base_url));

        {
            let mut state = self.state.write();
            state.is_submitting = false;
            state.last_error = result.as_ref().err().map(|_| FAILED_TO_CREATE_POST.to_string());
        }

        match result {
            Ok(post) => {
                info!(post_id = %post.id, "[feed-sync] Post created");
                self.navigator.navigate(Route::Feed);
                Ok(post)
            }
            Err(err) => {
                warn!(error = %err, "[feed-sync] Post create failed");
                Err(err)
            }
        }
    }
}

#[derive(Debug, Default)]
struct EditorState {
    post_id: Option<PostId>,
    content: String,
    image: Option<String>,
    is_submitting: bool,
    last_error: Option<String>,
}

/// Editor snapshot for rendering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorView {
    /// Post being edited.
    pub post_id: Option<PostId>,
    /// Content buffer.
    pub content: String,
    /// Current image, shown as a preview.
    pub image: Option<String>,
    /// Whether a save is outstanding.
    pub is_submitting: bool,
    /// Message of the last failure.
    pub last_error: Option<String>,
}

/// Edit form for an existing post.
pub struct PostEditor {
    gateway: Arc<dyn ApiGateway>,
    credentials: Arc<dyn CredentialProvider>,
    navigator: Arc<dyn Navigator>,
    media_base_url: String,
    state: RwLock<EditorState>,
}

impl PostEditor {
    /// Create an empty editor.
    pub fn new(
        gateway: Arc<dyn ApiGateway>,
        credentials: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
        media_base_url: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            credentials,
            navigator,
            media_base_url: media_base_url.into(),
            state: RwLock::new(EditorState::default()),
        }
    }

    /// Fetch a post and fill the buffer with its content.
    pub async fn open(&self, post_id: PostId) -> Result<(), FeedError> {
        let token = require_credential(self.credentials.as_ref(), self.navigator.as_ref())?;
        let result = self
            .gateway
            .call(ApiRequest::new(
                Endpoint::GetPost {
                    id: post_id.clone(),
                },
                Some(token),
            ))
            .await
            .map_err(FeedError::from)
            .and_then(|body| {
                let post = decode_saved_post(&body, &self.media_base_url)?;
                let raw = body
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok((post, raw))
            });

        let mut state = self.state.write();
        match result {
            Ok((post, content)) => {
                debug!(post_id = %post_id, "[feed-sync] Post opened for editing");
                *state = EditorState {
                    post_id: Some(post_id),
                    content,
                    image: post.image,
                    ..EditorState::default()
                };
                Ok(())
            }
            Err(err) => {
                warn!(post_id = %post_id, error = %err, "[feed-sync] Could not load post");
                state.last_error = Some(FAILED_TO_LOAD_POST.to_string());
                Err(err)
            }
        }
    }

    /// Replace the content buffer.
    pub fn set_content(&self, content: &str) {
        self.state.write().content = content.to_string();
    }

    /// Save the buffer and navigate back to the feed.
    ///
    /// On failure the buffer is kept.
    pub async fn save(&self) -> Result<Post, FeedError> {
        let token = require_credential(self.credentials.as_ref(), self.navigator.as_ref())?;
        let (id, content) = {
            let mut state = self.state.write();
            let Some(id) = state.post_id.clone() else {
                return Err(FeedError::PreconditionViolation("no post open".to_string()));
            };
            if state.is_submitting {
                return Err(SkipReason::SubmissionInFlight.into());
            }
            let content = normalize_comment_text(&state.content).ok_or(SkipReason::EmptyPost)?;
            state.is_submitting = true;
            (id, content)
        };

        let result = self
            .gateway
            .call(ApiRequest::new(
                Endpoint::UpdatePost {
                    id: id.clone(),
                    content,
                },
                Some(token),
            ))
            .await
            .map_err(FeedError::from)
            .and_then(|body| decode_saved_post(&body, &self.media_base_url));

        {
            let mut state = self.state.write();
            state.is_submitting = false;
            state.last_error = result.as_ref().err().map(|_| FAILED_TO_UPDATE_POST.to_string());
        }

        match result {
            Ok(post) => {
                info!(post_id = %id, "[feed-sync] Post updated");
                self.navigator.navigate(Route::Feed);
                Ok(post)
            }
            Err(err) => {
                warn!(post_id = %id, error = %err, "[feed-sync] Post update failed");
                Err(err)
            }
        }
    }

    /// Render snapshot.
    pub fn view(&self) -> EditorView {
        let state = self.state.read();
        EditorView {
            post_id: state.post_id.clone(),
            content: state.content.clone(),
            image: state.image.clone(),
            is_submitting: state.is_submitting,
            last_error: state.last_error.clone(),
        }
    }
}
