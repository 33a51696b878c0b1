//! # Ports Module
//!
//! Hexagonal architecture ports (inbound API, outbound dependencies).

pub mod inbound;
pub mod mock;
pub mod outbound;

pub use inbound::*;
pub use mock::*;
pub use outbound::*;
