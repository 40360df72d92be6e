//! Navigation operations implementation

use log::debug;

use crate::error::StorageError;
use crate::storage::results::Listing;
use crate::storage::validation::{join_path, normalize_path};
use crate::storage::Disklet;

/// A view of another disklet rooted at one of its folders.
///
/// Paths given to the view are resolved below `prefix`; since `..` never
/// validates, nothing outside the prefix is reachable.
pub struct NavigatedDisklet<D> {
    inner: D,
    prefix: String,
}

impl<D: Disklet> NavigatedDisklet<D> {
    pub fn new(inner: D, path: &str) -> Result<Self, StorageError> {
        let prefix = normalize_path(path)?;
        debug!("Navigated into '{}'", prefix);
        Ok(Self { inner, prefix })
    }

    /// Folder of the inner disklet this view is rooted at
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolves a path, keeping the view's root off-limits for file operations
    fn file_path(&self, path: &str) -> Result<String, StorageError> {
        if path.is_empty() {
            return Err(StorageError::InvalidPath(
                "the store root is not a file".to_string(),
            ));
        }
        self.scoped(path)
    }

    fn scoped(&self, path: &str) -> Result<String, StorageError> {
        let path = normalize_path(path)?;
        Ok(join_path(&self.prefix, &path))
    }
}

impl<D: Disklet> Disklet for NavigatedDisklet<D> {
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.inner.delete(&self.file_path(path)?).map_err(|e| self.unscope(e, path))
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.inner.get_data(&self.file_path(path)?).map_err(|e| self.unscope(e, path))
    }

    fn get_text(&self, path: &str) -> Result<String, StorageError> {
        self.inner.get_text(&self.file_path(path)?).map_err(|e| self.unscope(e, path))
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        // Child names are relative to the listed folder, so they need no rewriting.
        match self.inner.list(&self.scoped(path)?) {
            // A view onto a folder that does not exist yet behaves as an empty root.
            Err(StorageError::NotFound(_)) if path.is_empty() => Ok(Listing::new()),
            result => result.map_err(|e| self.unscope(e, path)),
        }
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.inner
            .set_data(&self.file_path(path)?, data)
            .map_err(|e| self.unscope(e, path))
    }

    fn set_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        self.inner
            .set_text(&self.file_path(path)?, text)
            .map_err(|e| self.unscope(e, path))
    }
}

impl<D> NavigatedDisklet<D> {
    /// Reports errors in terms of the view's paths rather than the inner ones.
    ///
    /// Paths below the prefix lose it; anything above it is replaced by the
    /// path the caller asked for.
    fn unscope(&self, err: StorageError, path: &str) -> StorageError {
        let relative = |inner: String| -> String {
            if self.prefix.is_empty() {
                return inner;
            }
            match inner.strip_prefix(self.prefix.as_str()) {
                Some("") => String::new(),
                Some(rest) => match rest.strip_prefix('/') {
                    Some(rest) => rest.to_string(),
                    None => path.to_string(),
                },
                None => path.to_string(),
            }
        };

        match err {
            StorageError::NotFound(p) => StorageError::NotFound(relative(p)),
            StorageError::NotAFolder(p) => StorageError::NotAFolder(relative(p)),
            StorageError::IsAFolder(p) => StorageError::IsAFolder(relative(p)),
            StorageError::DecodeError(p) => StorageError::DecodeError(relative(p)),
            other => other,
        }
    }
}
