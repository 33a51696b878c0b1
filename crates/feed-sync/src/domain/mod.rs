//! # Domain Module
//!
//! Core domain types for feed interaction sync.

pub mod decode;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod value_objects;

pub use decode::*;
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
