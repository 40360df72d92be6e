//! Merge middleware
//!
//! Layers a writable master store over a read fallback.

use log::debug;

use crate::error::StorageError;
use crate::storage::results::Listing;
use crate::storage::Disklet;

/// Reads fall through to `fallback` when `master` has nothing; writes go to `master`.
pub struct MergedDisklet<M, F> {
    master: M,
    fallback: F,
}

impl<M: Disklet, F: Disklet> MergedDisklet<M, F> {
    pub fn new(master: M, fallback: F) -> Self {
        Self { master, fallback }
    }
}

impl<M: Disklet, F: Disklet> Disklet for MergedDisklet<M, F> {
    /// Deletes from both stores. Both are attempted even if the first fails.
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        let master = self.master.delete(path);
        let fallback = self.fallback.delete(path);
        master.and(fallback)
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        match self.master.get_data(path) {
            Err(StorageError::NotFound(_)) => {
                debug!("{} not in master, reading fallback", path);
                self.fallback.get_data(path)
            }
            result => result,
        }
    }

    fn get_text(&self, path: &str) -> Result<String, StorageError> {
        match self.master.get_text(path) {
            Err(StorageError::NotFound(_)) => {
                debug!("{} not in master, reading fallback", path);
                self.fallback.get_text(path)
            }
            result => result,
        }
    }

    /// Union of both listings; master wins where kinds disagree.
    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        match (self.master.list(path), self.fallback.list(path)) {
            (Ok(master), Ok(mut merged)) => {
                merged.extend(master);
                Ok(merged)
            }
            // A fallback file shadowed by a master folder lists as the folder.
            (Ok(listing), Err(StorageError::NotFound(_) | StorageError::NotAFolder(_)))
            | (Err(StorageError::NotFound(_)), Ok(listing)) => Ok(listing),
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.master.set_data(path, data)
    }

    fn set_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        self.master.set_text(path, text)
    }
}
