//! Test fixtures: a fully wired client over mock ports.

use serde_json::{json, Value};
use std::sync::Arc;

use feed_sync::{
    FeedClientConfig, FeedCoordinator, InMemoryCredentials, InteractionStore, MemoryAssetSink,
    MockApiGateway, PostComposer, PostId, RecordingNavigator, Session, StoreDeps,
};

/// Everything a presentation layer would hold, with the mocks exposed.
pub struct TestClient {
    /// Scripted API.
    pub gateway: Arc<MockApiGateway>,
    /// Credential slot.
    pub credentials: Arc<InMemoryCredentials>,
    /// Records navigation intents.
    pub navigator: Arc<RecordingNavigator>,
    /// Records saved and opened assets.
    pub assets: Arc<MemoryAssetSink>,
    /// Feed under test.
    pub feed: Arc<FeedCoordinator>,
    /// Session over the same credential slot.
    pub session: Session,
    /// Media base used for decoding.
    pub media_base_url: String,
}

impl TestClient {
    /// Client holding a test token.
    pub fn signed_in(config: FeedClientConfig) -> Self {
        Self::build(config, InMemoryCredentials::signed_in("test-token"))
    }

    /// Client without a credential.
    pub fn anonymous(config: FeedClientConfig) -> Self {
        Self::build(config, InMemoryCredentials::anonymous())
    }

    fn build(config: FeedClientConfig, credentials: InMemoryCredentials) -> Self {
        let gateway = Arc::new(MockApiGateway::new());
        let credentials = Arc::new(credentials);
        let navigator = Arc::new(RecordingNavigator::new());
        let assets = Arc::new(MemoryAssetSink::new());

        let deps = StoreDeps {
            gateway: gateway.clone(),
            credentials: credentials.clone(),
            assets: assets.clone(),
        };
        let feed = Arc::new(FeedCoordinator::new(&config, deps, navigator.clone()));
        let session = Session::new(credentials.clone(), navigator.clone(), feed.clone());

        Self {
            gateway,
            credentials,
            navigator,
            assets,
            feed,
            session,
            media_base_url: config.media_base_url,
        }
    }

    /// Store for `id` from the last applied load.
    pub fn store(&self, id: &str) -> Option<Arc<InteractionStore>> {
        self.feed.store(&PostId::new(id))
    }

    /// Composer sharing this client's ports.
    pub fn composer(&self) -> PostComposer {
        PostComposer::new(
            self.gateway.clone(),
            self.credentials.clone(),
            self.navigator.clone(),
            self.media_base_url.clone(),
        )
    }
}

/// A post as the server lists it.
pub fn post_json(id: &str, content: &str) -> Value {
    json!({
        "id": id,
        "author": {"username": "ada"},
        "content": content,
        "created_at": "2024-03-05T10:00:00Z",
        "likes": [],
        "comments": []
    })
}
