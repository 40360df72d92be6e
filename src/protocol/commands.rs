//! Module `commands`
//!
//! Request types for the JSON-lines wire protocol. Each line carries one
//! request; `op` selects the operation.

use serde::Deserialize;

/// Represents a request parsed from a client line.
#[derive(Debug, PartialEq, Deserialize)]
pub struct Request {
    /// Echoed back on the matching response
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub command: Command,
}

/// Represents a store operation and its arguments.
///
/// Binary payloads travel as base64 strings.
#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Command {
    Delete { path: String },
    GetData { path: String },
    GetText { path: String },
    List {
        #[serde(default)]
        path: String,
    },
    DeepList {
        #[serde(default)]
        path: String,
    },
    SetData { path: String, data: String },
    SetText { path: String, text: String },
}

impl Command {
    /// Store path the command targets
    pub fn path(&self) -> &str {
        match self {
            Command::Delete { path }
            | Command::GetData { path }
            | Command::GetText { path }
            | Command::List { path }
            | Command::DeepList { path }
            | Command::SetData { path, .. }
            | Command::SetText { path, .. } => path,
        }
    }

    /// Wire name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            Command::Delete { .. } => "delete",
            Command::GetData { .. } => "getData",
            Command::GetText { .. } => "getText",
            Command::List { .. } => "list",
            Command::DeepList { .. } => "deepList",
            Command::SetData { .. } => "setData",
            Command::SetText { .. } => "setText",
        }
    }
}
