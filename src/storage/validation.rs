//! Path validation
//!
//! Handles path validation and root confinement checks.
//!
//! Store paths are relative, `/`-separated strings. The empty string names
//! the root folder. Validation happens before any filesystem access.

use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::operations::is_missing;

/// Prefix shared by staged-write temporaries
pub const STAGING_PREFIX: &str = ".disklet-";

/// Suffix shared by staged-write temporaries
pub const STAGING_SUFFIX: &str = ".tmp";

/// Returns true if `name` looks like a staged-write temporary
pub fn is_staging_name(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) && name.ends_with(STAGING_SUFFIX)
}

/// Splits a store path into validated segments.
///
/// An empty path yields no segments (the root).
pub fn split_path(path: &str) -> Result<Vec<&str>, StorageError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }

    if path.starts_with('/') {
        return Err(StorageError::InvalidPath(format!(
            "{}: absolute paths are not supported",
            path
        )));
    }

    path.split('/')
        .map(|segment| validate_segment(path, segment).map(|_| segment))
        .collect()
}

fn validate_segment(path: &str, segment: &str) -> Result<(), StorageError> {
    let reason = match segment {
        "" => "empty segment",
        "." => "'.' segment",
        ".." => "path would escape folder",
        s if s.contains('\0') => "NUL byte in segment",
        s if s.contains('\\') => "backslash in segment",
        s if is_staging_name(s) => "reserved name",
        _ => return Ok(()),
    };

    Err(StorageError::InvalidPath(format!("{}: {}", path, reason)))
}

/// Validates a path and returns it unchanged, for use as a key.
pub fn normalize_path(path: &str) -> Result<String, StorageError> {
    split_path(path).map(|segments| segments.join("/"))
}

/// Joins two store paths, either of which may be the root.
pub fn join_path(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}/{}", prefix, path),
    }
}

/// Maps validated segments to a real path under `root`
pub fn virtual_to_real_path(root: &Path, segments: &[&str]) -> PathBuf {
    segments.iter().fold(root.to_path_buf(), |acc, s| acc.join(s))
}

/// Verifies `real_path` stays inside `root` once symlinks are resolved.
///
/// `root` must already be canonical. The target may not exist yet, so the
/// deepest existing ancestor is canonicalized instead.
pub fn ensure_confined(root: &Path, real_path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    let mut ancestor = real_path;
    let canonical = loop {
        match ancestor.canonicalize() {
            Ok(canonical) => break canonical,
            Err(e) if is_missing(&e) => match ancestor.parent() {
                Some(parent) => ancestor = parent,
                None => return Err(StorageError::InvalidPath(virtual_path.to_string())),
            },
            Err(e) => return Err(StorageError::IoFailure(e)),
        }
    };

    if !canonical.starts_with(root) {
        return Err(StorageError::InvalidPath(format!(
            "{}: resolves outside the store root",
            virtual_path
        )));
    }

    Ok(())
}
