//! Error handlers
//!
//! Maps errors onto the discriminated codes seen by protocol clients.

use crate::error::types::{ProtocolError, StorageError};
use log::{error, warn};

/// Log a storage failure at a level matching its severity
pub fn handle_error(operation: &str, err: &StorageError) {
    match err {
        StorageError::IoFailure(_) => error!("{} failed: {}", operation, err),
        _ => warn!("{} failed: {}", operation, err),
    }
}

/// Convert a storage error to its boundary code
pub fn error_code(err: &StorageError) -> &'static str {
    match err {
        StorageError::InvalidPath(_) => "EINVAL",
        StorageError::NotFound(_) => "ENOENT",
        StorageError::NotAFolder(_) => "ENOTDIR",
        StorageError::IsAFolder(_) => "EISDIR",
        StorageError::DecodeError(_) => "EILSEQ",
        StorageError::IoFailure(_) => "EIO",
    }
}

/// Convert a storage error to the message sent with its code
pub fn error_message(err: &StorageError) -> String {
    match err {
        StorageError::NotFound(path) => format!("Cannot read '{}'", path),
        other => other.to_string(),
    }
}

/// Convert a protocol error to its boundary code
pub fn protocol_error_code(err: &ProtocolError) -> &'static str {
    match err {
        ProtocolError::MalformedRequest(_) => "EPROTO",
        ProtocolError::RequestTooLong { .. } => "EPROTO",
        ProtocolError::InvalidBase64(_) => "EINVAL",
    }
}
