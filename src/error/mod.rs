//! Error handling
//!
//! Defines error types and the boundary code mapping.

pub mod handlers;
pub mod types;

pub use types::*;
