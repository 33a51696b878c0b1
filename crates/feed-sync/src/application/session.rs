//! # Session
//!
//! Sign-in state as seen by the feed: whether a credential exists, and
//! logging out.

use std::sync::Arc;
use tracing::info;

use super::feed_coordinator::FeedCoordinator;
use crate::domain::Route;
use crate::ports::{CredentialProvider, Navigator};

/// User session.
pub struct Session {
    credentials: Arc<dyn CredentialProvider>,
    navigator: Arc<dyn Navigator>,
    feed: Arc<FeedCoordinator>,
}

impl Session {
    /// Create a session over the shared credential provider.
    pub fn new(
        credentials: Arc<dyn CredentialProvider>,
        navigator: Arc<dyn Navigator>,
        feed: Arc<FeedCoordinator>,
    ) -> Self {
        Self {
            credentials,
            navigator,
            feed,
        }
    }

    /// Whether a credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.get().is_some()
    }

    /// Forget the credential, drop every store and go to the login screen.
    pub fn logout(&self) {
        self.credentials.clear();
        self.feed.reset();
        info!("[feed-sync] Logged out");
        self.navigator.navigate(Route::Login);
    }
}
