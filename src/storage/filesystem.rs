//! File system storage
//!
//! `FsDisklet` stores entries as real files and folders beneath a fixed root.

use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::Disklet;
use crate::storage::operations;
use crate::storage::results::Listing;
use crate::storage::validation::{ensure_confined, split_path, virtual_to_real_path};

/// Disklet backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FsDisklet {
    root: PathBuf,
}

impl FsDisklet {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StorageError> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;

        let root = root.canonicalize()?;
        if !root.is_dir() {
            return Err(StorageError::IoFailure(io::Error::other(format!(
                "store root {} is not a directory",
                root.display()
            ))));
        }

        info!("Disklet root directory: {}", root.display());
        Ok(Self { root })
    }

    /// Canonical root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a store path to a confined real path.
    ///
    /// The root itself is only returned when `allow_root` is set.
    fn resolve<'a>(&self, path: &'a str, allow_root: bool) -> Result<(PathBuf, Vec<&'a str>), StorageError> {
        let segments = split_path(path)?;
        if segments.is_empty() && !allow_root {
            return Err(StorageError::InvalidPath(
                "the store root is not a file".to_string(),
            ));
        }

        let real_path = virtual_to_real_path(&self.root, &segments);
        ensure_confined(&self.root, &real_path, path)?;
        Ok((real_path, segments))
    }
}

impl Disklet for FsDisklet {
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let (real_path, _) = self.resolve(path, false)?;
        operations::remove_entry(&real_path, path)
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let (real_path, _) = self.resolve(path, false)?;
        operations::read_file(&real_path, path)
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        let (real_path, _) = self.resolve(path, true)?;
        operations::list_directory(&real_path, path)
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let (real_path, segments) = self.resolve(path, false)?;

        if real_path.is_dir() {
            return Err(StorageError::IsAFolder(path.to_string()));
        }

        operations::create_ancestors(&self.root, &segments)?;
        debug!("Staging {} bytes for {}", data.len(), path);
        operations::write_staged(&real_path, path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::EntryKind;

    fn scratch() -> (tempfile::TempDir, FsDisklet) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsDisklet::new(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn creates_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("app").join("files");
        let store = FsDisklet::new(&root).unwrap();
        assert!(store.root().is_dir());
    }

    #[test]
    fn rejects_file_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(FsDisklet::new(&file).is_err());
    }

    #[test]
    fn data_round_trip_creates_parents() {
        let (_dir, store) = scratch();
        let bytes = [0u8, 159, 146, 150, 255];

        store.set_data("a/b/c.bin", &bytes).unwrap();
        assert_eq!(store.get_data("a/b/c.bin").unwrap(), bytes);
        assert!(store.root().join("a/b").is_dir());
    }

    #[test]
    fn text_round_trip() {
        let (_dir, store) = scratch();
        store.set_text("notes.txt", "héllo\nwörld").unwrap();
        assert_eq!(store.get_text("notes.txt").unwrap(), "héllo\nwörld");
    }

    #[test]
    fn overwrite_leaves_no_residue() {
        let (_dir, store) = scratch();
        store.set_data("x", b"a much longer first value").unwrap();
        store.set_data("x", b"short").unwrap();
        assert_eq!(store.get_data("x").unwrap(), b"short");
    }

    #[test]
    fn invalid_utf8_is_decode_error() {
        let (_dir, store) = scratch();
        store.set_data("bin", &[0xff, 0xfe]).unwrap();
        assert!(matches!(store.get_text("bin"), Err(StorageError::DecodeError(_))));
    }

    #[test]
    fn reading_folder_is_not_found() {
        let (_dir, store) = scratch();
        store.set_text("a/b.txt", "x").unwrap();
        assert!(matches!(store.get_data("a"), Err(StorageError::NotFound(p)) if p == "a"));
        assert!(matches!(store.get_text("missing"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn writing_onto_folder_fails() {
        let (_dir, store) = scratch();
        store.set_text("a/b.txt", "x").unwrap();
        assert!(matches!(store.set_data("a", b"y"), Err(StorageError::IsAFolder(_))));
        assert_eq!(store.get_text("a/b.txt").unwrap(), "x");
    }

    #[test]
    fn writing_beneath_file_fails() {
        let (_dir, store) = scratch();
        store.set_text("a", "file").unwrap();
        assert!(matches!(
            store.set_text("a/b.txt", "x"),
            Err(StorageError::NotAFolder(p)) if p == "a"
        ));
    }

    #[test]
    fn listing_reports_kinds() {
        let (_dir, store) = scratch();
        store.set_data("a/b.txt", b"1").unwrap();
        store.set_data("c", b"2").unwrap();

        let root = store.list("").unwrap();
        assert_eq!(root.len(), 2);
        assert_eq!(root["a"], EntryKind::Folder);
        assert_eq!(root["c"], EntryKind::File);

        let sub = store.list("a").unwrap();
        assert_eq!(sub.len(), 1);
        assert_eq!(sub["b.txt"], EntryKind::File);
    }

    #[test]
    fn listing_errors() {
        let (_dir, store) = scratch();
        store.set_data("file", b"1").unwrap();
        assert!(matches!(store.list("nope"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.list("file"), Err(StorageError::NotAFolder(_))));
    }

    #[test]
    fn delete_removes_subtree_and_is_idempotent() {
        let (_dir, store) = scratch();
        store.set_data("a/b/c.txt", b"1").unwrap();
        store.set_data("a/d.txt", b"2").unwrap();

        store.delete("a").unwrap();
        assert!(matches!(store.get_data("a/d.txt"), Err(StorageError::NotFound(_))));
        assert!(store.list("").unwrap().is_empty());

        store.delete("a").unwrap();
        store.delete("never/existed").unwrap();
    }

    #[test]
    fn empty_path_only_lists() {
        let (_dir, store) = scratch();
        assert!(store.list("").is_ok());
        assert!(matches!(store.delete(""), Err(StorageError::InvalidPath(_))));
        assert!(matches!(store.get_data(""), Err(StorageError::InvalidPath(_))));
        assert!(matches!(store.set_data("", b"x"), Err(StorageError::InvalidPath(_))));
    }

    #[test]
    fn escape_attempts_touch_nothing() {
        let (dir, store) = scratch();
        let outside = dir.path().parent().unwrap().join("secret");

        assert!(matches!(store.set_data("../secret", b"x"), Err(StorageError::InvalidPath(_))));
        assert!(!outside.exists());
        assert!(matches!(store.delete("a/../../secret"), Err(StorageError::InvalidPath(_))));
        assert!(matches!(store.list(".."), Err(StorageError::InvalidPath(_))));
        assert!(matches!(store.get_data("/etc/hosts"), Err(StorageError::InvalidPath(_))));
    }
}
