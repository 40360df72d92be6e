//! Error types
//!
//! Defines domain-specific error types for the store, the wire protocol and the server.

use std::fmt;
use std::io;

/// Storage module errors
///
/// Every failing store operation produces exactly one of these.
#[derive(Debug)]
pub enum StorageError {
    /// Path escapes the root or contains a disallowed segment.
    InvalidPath(String),
    /// Nothing readable exists at the path.
    NotFound(String),
    /// A folder was expected but a file is in the way.
    NotAFolder(String),
    /// A file was expected but the path names a folder.
    IsAFolder(String),
    /// File content is not valid UTF-8.
    DecodeError(String),
    /// Underlying storage medium failure.
    IoFailure(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::NotAFolder(p) => write!(f, "Not a folder: {}", p),
            StorageError::IsAFolder(p) => write!(f, "Is a folder: {}", p),
            StorageError::DecodeError(p) => write!(f, "Invalid UTF-8 in {}", p),
            StorageError::IoFailure(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoFailure(error)
    }
}

/// Wire protocol errors, raised before a request reaches the store
#[derive(Debug)]
pub enum ProtocolError {
    MalformedRequest(String),
    RequestTooLong { length: usize, limit: usize },
    InvalidBase64(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedRequest(msg) => write!(f, "Malformed request: {}", msg),
            ProtocolError::RequestTooLong { length, limit } => {
                write!(f, "Request too long: {} bytes (limit {})", length, limit)
            }
            ProtocolError::InvalidBase64(_) => write!(f, "Invalid base64 data"),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(error: serde_json::Error) -> Self {
        ProtocolError::MalformedRequest(error.to_string())
    }
}

/// Startup errors for the server binary
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Storage(StorageError),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Storage(e) => write!(f, "Storage error: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<StorageError> for ServerError {
    fn from(error: StorageError) -> Self {
        ServerError::Storage(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}
