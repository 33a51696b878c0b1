//! # Application Module
//!
//! Services orchestrating the domain and outbound ports: the feed
//! coordinator, one interaction store per post, the session and the post
//! forms.

pub mod composer;
pub mod feed_coordinator;
pub mod interaction_store;
pub mod session;

pub use composer::{
    EditorView, PostComposer, PostEditor, FAILED_TO_CREATE_POST, FAILED_TO_LOAD_POST,
    FAILED_TO_UPDATE_POST,
};
pub use feed_coordinator::{FeedCoordinator, FeedPhase, LoadOutcome, LoadReport};
pub use interaction_store::{DownloadAffordance, InteractionStore, PostView, StoreDeps};
pub use session::Session;
