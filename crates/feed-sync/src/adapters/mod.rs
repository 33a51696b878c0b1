//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound ports for a headless client: a `reqwest`
//! gateway, an in-memory credential slot, a filesystem asset sink and a
//! logging navigator.

mod asset_sink;
mod credentials;
mod http_gateway;
mod navigator;

pub use asset_sink::FsAssetSink;
pub use credentials::InMemoryCredentials;
pub use http_gateway::HttpApiGateway;
pub use navigator::LogNavigator;
