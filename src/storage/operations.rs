//! Storage operations
//!
//! Filesystem primitives behind the file store: read, list, remove, and
//! staged writes. Callers pass both the real path and the store path so
//! errors name what the client asked for.

use log::{debug, info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::StorageError;
use crate::storage::results::{EntryKind, Listing};
use crate::storage::validation::{STAGING_PREFIX, STAGING_SUFFIX, is_staging_name};

/// Reads the full content of a file
pub fn read_file(real_path: &Path, virtual_path: &str) -> Result<Vec<u8>, StorageError> {
    let metadata = match fs::metadata(real_path) {
        Ok(metadata) => metadata,
        Err(e) if is_missing(&e) => {
            return Err(StorageError::NotFound(virtual_path.to_string()));
        }
        Err(e) => return Err(StorageError::from(e)),
    };

    if !metadata.is_file() {
        return Err(StorageError::NotFound(virtual_path.to_string()));
    }

    match fs::read(real_path) {
        Ok(data) => {
            debug!("Read {} ({} bytes)", virtual_path, data.len());
            Ok(data)
        }
        // Removed between the metadata check and the read.
        Err(e) if is_missing(&e) => {
            Err(StorageError::NotFound(virtual_path.to_string()))
        }
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Lists the immediate children of a folder
pub fn list_directory(real_path: &Path, virtual_path: &str) -> Result<Listing, StorageError> {
    let metadata = match fs::metadata(real_path) {
        Ok(metadata) => metadata,
        Err(e) if is_missing(&e) => {
            return Err(StorageError::NotFound(virtual_path.to_string()));
        }
        Err(e) => return Err(StorageError::from(e)),
    };

    if !metadata.is_dir() {
        return Err(StorageError::NotAFolder(virtual_path.to_string()));
    }

    let mut listing = Listing::new();
    for entry in fs::read_dir(real_path)? {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("Skipping non UTF-8 entry {:?} in {}", raw, virtual_path);
                continue;
            }
        };

        if is_staging_name(&name) {
            continue;
        }

        // Follow symlinks; dangling links and special files are skipped.
        let kind = match fs::metadata(entry.path()) {
            Ok(m) if m.is_dir() => EntryKind::Folder,
            Ok(m) if m.is_file() => EntryKind::File,
            _ => continue,
        };

        listing.insert(name, kind);
    }

    debug!("Listed {} - {} entries", display_path(virtual_path), listing.len());
    Ok(listing)
}

/// Removes a file or a whole folder subtree. Missing targets are not an error.
pub fn remove_entry(real_path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    let metadata = match fs::symlink_metadata(real_path) {
        Ok(metadata) => metadata,
        Err(e) if is_missing(&e) => {
            debug!("Delete of missing {} ignored", virtual_path);
            return Ok(());
        }
        Err(e) => return Err(StorageError::from(e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(real_path)
    } else {
        fs::remove_file(real_path)
    };

    match result {
        Ok(()) => {
            info!("Deleted {}", virtual_path);
            Ok(())
        }
        Err(e) if is_missing(&e) => Ok(()),
        Err(e) => Err(StorageError::from(e)),
    }
}

/// Creates every missing folder between `root` and the parent of `real_path`.
///
/// Each ancestor that already exists must be a folder.
pub fn create_ancestors(root: &Path, segments: &[&str]) -> Result<(), StorageError> {
    let mut current = root.to_path_buf();
    let parents = segments.len().saturating_sub(1);

    for (depth, segment) in segments[..parents].iter().enumerate() {
        current.push(segment);
        match fs::metadata(&current) {
            Ok(m) if m.is_dir() => continue,
            Ok(_) => return Err(StorageError::NotAFolder(segments[..=depth].join("/"))),
            Err(e) if is_missing(&e) => {
                match fs::create_dir(&current) {
                    Ok(()) => {}
                    // Lost a race with another writer creating the same folder.
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists && current.is_dir() => {}
                    Err(e) => return Err(StorageError::from(e)),
                }
            }
            Err(e) => return Err(StorageError::from(e)),
        }
    }

    Ok(())
}

/// Replaces the content at `real_path` with `data` via a temporary in the same folder.
///
/// Readers see either the old or the new content. On failure the temporary
/// is removed and any previous file is untouched.
pub fn write_staged(real_path: &Path, virtual_path: &str, data: &[u8]) -> Result<(), StorageError> {
    let parent = real_path
        .parent()
        .ok_or_else(|| StorageError::InvalidPath(virtual_path.to_string()))?;

    let mut staged = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .suffix(STAGING_SUFFIX)
        .tempfile_in(parent)?;

    staged.write_all(data)?;
    staged.as_file().sync_all()?;

    // A folder may have appeared at the target since the caller checked.
    if real_path.is_dir() {
        return Err(StorageError::IsAFolder(virtual_path.to_string()));
    }

    staged
        .persist(real_path)
        .map_err(|e| rename_error(e.error, virtual_path))?;

    info!("Wrote {} ({} bytes)", virtual_path, data.len());
    Ok(())
}

/// Maps a failed rename onto the target, which may have become a folder meanwhile
fn rename_error(error: io::Error, virtual_path: &str) -> StorageError {
    match error.kind() {
        io::ErrorKind::IsADirectory => StorageError::IsAFolder(virtual_path.to_string()),
        _ => StorageError::IoFailure(error),
    }
}

/// True for errors meaning "nothing there", including a file where a folder was expected
pub fn is_missing(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

fn display_path(virtual_path: &str) -> &str {
    if virtual_path.is_empty() { "<root>" } else { virtual_path }
}
