//! Navigate module
//!
//! Scoping a disklet to one of its sub-folders, and walking folder trees.

mod listing;
mod operations;

// Re-export public types and functions
pub use listing::{deep_list, dump_data};
pub use operations::NavigatedDisklet;
