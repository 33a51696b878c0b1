//! # Feed-Sync Test Suite
//!
//! Cross-component flows driven through the public API with scripted
//! ports.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Wired client over mock ports
//! └── integration/      # Feed, interaction and session flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p feed-tests
//! cargo test -p feed-tests integration::feed_flows
//! cargo bench -p feed-tests
//! ```

pub mod fixtures;
pub mod integration;
