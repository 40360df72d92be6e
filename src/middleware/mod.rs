//! Disklet middleware
//!
//! Wrappers that add logging or layering on top of another disklet.

pub mod logging;
pub mod merge;

pub use logging::{LogCallback, LogOperation, LogOptions, LoggedDisklet};
pub use merge::MergedDisklet;
