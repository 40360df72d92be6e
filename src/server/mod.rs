//! Server core functionality
//!
//! TCP service exposing a disklet over the JSON-lines protocol.

pub mod config;
pub mod core;
pub mod session;

pub use self::config::ServerConfig;
pub use self::core::{Server, open_store};
