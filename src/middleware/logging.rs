//! Logging middleware
//!
//! Wraps a disklet and reports each operation before forwarding it.

use log::{debug, info};
use std::fmt;

use crate::error::StorageError;
use crate::storage::results::Listing;
use crate::storage::Disklet;

/// Operation names as they appear in log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOperation {
    Delete,
    GetData,
    GetText,
    List,
    SetData,
    SetText,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::Delete => "delete",
            LogOperation::GetData => "get data",
            LogOperation::GetText => "get text",
            LogOperation::List => "list",
            LogOperation::SetData => "set data",
            LogOperation::SetText => "set text",
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            LogOperation::Delete | LogOperation::SetData | LogOperation::SetText
        )
    }
}

impl fmt::Display for LogOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type LogCallback = Box<dyn Fn(&str, LogOperation) + Send + Sync>;

#[derive(Default)]
pub struct LogOptions {
    /// Report reads as well as mutations
    pub verbose: bool,
    /// Invoked with every reported operation
    pub callback: Option<LogCallback>,
}

pub struct LoggedDisklet<D> {
    inner: D,
    options: LogOptions,
}

impl<D: Disklet> LoggedDisklet<D> {
    pub fn new(inner: D, options: LogOptions) -> Self {
        Self { inner, options }
    }

    fn log(&self, operation: LogOperation, path: &str) {
        if !(self.options.verbose || operation.is_mutation()) {
            debug!("{} \"{}\"", operation, path);
            return;
        }

        info!("{} \"{}\"", operation, path);
        if let Some(callback) = &self.options.callback {
            callback(path, operation);
        }
    }
}

impl<D: Disklet> Disklet for LoggedDisklet<D> {
    fn delete(&self, path: &str) -> Result<(), StorageError> {
        self.log(LogOperation::Delete, path);
        self.inner.delete(path)
    }

    fn get_data(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        self.log(LogOperation::GetData, path);
        self.inner.get_data(path)
    }

    fn get_text(&self, path: &str) -> Result<String, StorageError> {
        self.log(LogOperation::GetText, path);
        self.inner.get_text(path)
    }

    fn list(&self, path: &str) -> Result<Listing, StorageError> {
        self.log(LogOperation::List, path);
        self.inner.list(path)
    }

    fn set_data(&self, path: &str, data: &[u8]) -> Result<(), StorageError> {
        self.log(LogOperation::SetData, path);
        self.inner.set_data(path, data)
    }

    fn set_text(&self, path: &str, text: &str) -> Result<(), StorageError> {
        self.log(LogOperation::SetText, path);
        self.inner.set_text(path, text)
    }
}
