//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kind tag for a listed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a directory listing: child name to kind.
///
/// Sorted only so output is stable; callers must not rely on order.
pub type Listing = BTreeMap<String, EntryKind>;
