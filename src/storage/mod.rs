//! File storage
//!
//! The `Disklet` contract, path validation, and the filesystem and
//! in-memory backends.

pub mod filesystem;
pub mod memory;
pub mod operations;
pub mod results;
pub mod validation;

use std::sync::Arc;

use crate::error::StorageError;

pub use filesystem::FsDisklet;
pub use memory::MemoryDisklet;
pub use results::{EntryKind, Listing};
pub use validation::{join_path, normalize_path, split_path};

/// A path-addressed byte and text store confined to one root folder.
///
/// Paths are relative and `/`-separated; the empty path names the root and
/// is only accepted by [`Disklet::list`]. Every call either succeeds or
/// fails with exactly one [`StorageError`].
pub trait Disklet: Send + Sync {
    /// Like `rm -r path`. Deleting something that does not exist succeeds.
    fn delete(&self, path: &str) -> Result<(), StorageError>;

    /// Like `cat path`.
    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError>;

    fn get_text(&self, path: &str) -> Result<String, StorageError> {
        let data = self.get_data(path)?;
        String::from_utf8(data).map_err(|_| StorageError::DecodeError(path.to_string()))
    }

    /// Like `ls path`: immediate children with their kinds.
    fn list(&self, path: &str) -> Result<Listing, StorageError>;

    /// Like `mkdir -p $(dirname path); echo data > path`.
    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError>;

    fn set_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        self.set_data(path, text.as_bytes())
    }
}

impl<T: Disklet + ?Sized> Disklet for Arc<T> {
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        (**self).delete(path)
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).get_data(path)
    }

    fn get_text(&self, path: &str) -> Result<String, StorageError> {
        (**self).get_text(path)
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        (**self).list(path)
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        (**self).set_data(path, data)
    }

    fn set_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        (**self).set_text(path, text)
    }
}

impl<T: Disklet + ?Sized> Disklet for Box<T> {
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        (**self).delete(path)
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        (**self).get_data(path)
    }

    fn get_text(&self, path: &str) -> Result<String, StorageError> {
        (**self).get_text(path)
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        (**self).list(path)
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        (**self).set_data(path, data)
    }

    fn set_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        (**self).set_text(path, text)
    }
}
