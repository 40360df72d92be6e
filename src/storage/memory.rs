//! In-memory storage
//!
//! Emulates a file store in memory. Folders exist only while they hold files.

use std::collections::BTreeMap;
use std::io;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::StorageError;
use crate::storage::Disklet;
use crate::storage::results::{EntryKind, Listing};
use crate::storage::validation::split_path;

type Files = BTreeMap<String, Vec<u8>>;

#[derive(Debug, Default)]
pub struct MemoryDisklet {
    files: RwLock<Files>,
}

impl MemoryDisklet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a store from existing `path -> content` pairs.
    pub fn with_files<I, P, D>(files: I) -> Result<Self, StorageError>
    where
        I: IntoIterator<Item = (P, D)>,
        P: AsRef<str>,
        D: Into<Vec<u8>>,
    {
        let store = Self::new();
        for (path, data) in files {
            let data: Vec<u8> = data.into();
            store.set_data(path.as_ref(), &data)?;
        }
        Ok(store)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Files>, StorageError> {
        self.files.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Files>, StorageError> {
        self.files.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> StorageError {
    StorageError::IoFailure(io::Error::other("memory store lock poisoned"))
}

/// Validates a non-root path and returns its canonical key
fn file_key(path: &str) -> Result<String, StorageError> {
    let segments = split_path(path)?;
    if segments.is_empty() {
        return Err(StorageError::InvalidPath(
            "the store root is not a file".to_string(),
        ));
    }
    Ok(segments.join("/"))
}

fn folder_prefix(key: &str) -> String {
    if key.is_empty() {
        String::new()
    } else {
        format!("{}/", key)
    }
}

/// Keys strictly beneath the folder `key`
fn descendants<'a>(files: &'a Files, key: &str) -> impl Iterator<Item = &'a String> + 'a {
    let prefix = folder_prefix(key);
    files
        .range(prefix.clone()..)
        .map(|(k, _)| k)
        .take_while(move |k| k.starts_with(&prefix))
}

impl Disklet for MemoryDisklet {
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let key = file_key(path)?;
        let mut files = self.write()?;

        files.remove(&key);
        let doomed: Vec<String> = descendants(&files, &key).cloned().collect();
        for k in doomed {
            files.remove(&k);
        }
        Ok(())
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let key = file_key(path)?;
        let files = self.read()?;
        files
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.to_string()))
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        let key = split_path(path)?.join("/");
        let files = self.read()?;

        if files.contains_key(&key) {
            return Err(StorageError::NotAFolder(path.to_string()));
        }

        let prefix_len = folder_prefix(&key).len();
        let mut listing = Listing::new();
        for child in descendants(&files, &key) {
            let rest = &child[prefix_len..];
            match rest.split_once('/') {
                Some((name, _)) => listing.insert(name.to_string(), EntryKind::Folder),
                None => listing.insert(rest.to_string(), EntryKind::File),
            };
        }

        if listing.is_empty() && !key.is_empty() {
            return Err(StorageError::NotFound(path.to_string()));
        }
        Ok(listing)
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        let key = file_key(path)?;
        let mut files = self.write()?;

        if descendants(&files, &key).next().is_some() {
            return Err(StorageError::IsAFolder(path.to_string()));
        }

        let mut ancestor = String::new();
        let segments: Vec<&str> = key.split('/').collect();
        for segment in &segments[..segments.len() - 1] {
            if !ancestor.is_empty() {
                ancestor.push('/');
            }
            ancestor.push_str(segment);
            if files.contains_key(&ancestor) {
                return Err(StorageError::NotAFolder(ancestor));
            }
        }

        files.insert(key, data.to_vec());
        Ok(())
    }
}
