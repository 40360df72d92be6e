//! Protocol responses
//!
//! Every request gets exactly one response: a result or an error, never both.

use serde::Serialize;
use serde_json::Value;

use crate::error::handlers::{error_code, error_message, protocol_error_code};
use crate::error::{ProtocolError, StorageError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Response {
    pub fn success(id: Option<u64>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<u64>, code: &str, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.into(),
            }),
        }
    }

    pub fn from_storage_error(id: Option<u64>, err: &StorageError) -> Self {
        Self::failure(id, error_code(err), error_message(err))
    }

    pub fn from_protocol_error(id: Option<u64>, err: &ProtocolError) -> Self {
        Self::failure(id, protocol_error_code(err), err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Serialize as a single newline-terminated line
    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"id":null,"error":{{"code":"EIO","message":"unserializable response: {}"}}}}"#,
                e
            )
        });
        line.push('\n');
        line
    }
}
