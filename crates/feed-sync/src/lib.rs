//! # Feed Sync
//!
//! Client-side interaction state for a social feed.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Keep what a user sees on each post consistent with the server while
//! requests are in flight:
//! - Likes are optimistic and applied before the server answers
//! - Comments are pessimistic and appended only after the server confirms
//! - Image downloads fall back to an external viewer
//! - Feed loads resolve last-resolved-wins, tagged by ticket
//!
//! ## Guards
//!
//! | Intent | Guard | Refused when |
//! |--------|-------|--------------|
//! | `like()` | like in flight | already liked or a like is outstanding |
//! | `submit_comment()` | `is_submitting` | empty text or a submission is outstanding |
//! | `download()` | `is_downloading` | a download is outstanding |
//! | `load()` | credential | no credential (redirects to sign-up) |
//!
//! ## Module Structure
//!
//! ```text
//! feed-sync/
//! ├── domain/          # Post, LikeState, CommentState, errors, decoding
//! ├── ports/           # API traits (inbound) + dependency traits (outbound) + mocks
//! ├── application/     # FeedCoordinator, InteractionStore, Session, post forms
//! ├── adapters/        # reqwest gateway, credentials, asset sink, navigator
//! └── config.rs        # FeedClientConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{FsAssetSink, HttpApiGateway, InMemoryCredentials, LogNavigator};
pub use application::{
    DownloadAffordance, EditorView, FeedCoordinator, FeedPhase, InteractionStore, LoadOutcome,
    LoadReport, PostComposer, PostEditor, PostView, Session, StoreDeps,
};
pub use config::{ConfigError, FeedClientConfig};
pub use domain::{
    AuthToken, Author, Comment, CommentId, CurrentUser, DownloadResult, FeedError, GatewayError,
    IntentOutcome, LikeFailurePolicy, LocalId, Post, PostId, Route, SavedAsset, SkipReason,
    Timestamp,
};
pub use ports::{
    ApiGateway, ApiRequest, AssetSink, CredentialProvider, Endpoint, FeedApi, Gate,
    InteractionApi, MemoryAssetSink, Method, MockApiGateway, Navigator, RecordingNavigator,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
