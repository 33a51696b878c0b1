//! Integration flows.

pub mod feed_flows;
pub mod interaction_flows;
pub mod session_flows;
