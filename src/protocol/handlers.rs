//! Protocol handlers
//!
//! Executes parsed requests against a disklet and builds the single
//! response each one is owed.

use log::debug;
use serde_json::Value;

use crate::error::{ProtocolError, StorageError};
use crate::error::handlers::handle_error;
use crate::navigate::deep_list;
use crate::protocol::codec::{decode_data, encode_data};
use crate::protocol::commands::{Command, Request};
use crate::protocol::responses::Response;
use crate::storage::Disklet;
use crate::storage::results::Listing;

/// Runs one request to completion. Blocking; call from a blocking context.
pub fn handle_request<D: Disklet + ?Sized>(disklet: &D, request: Request) -> Response {
    let Request { id, command } = request;
    debug!("Handling {} '{}' (id {:?})", command.name(), command.path(), id);

    let name = command.name();
    let operation = match Operation::decode(command) {
        Ok(operation) => operation,
        Err(e) => return Response::from_protocol_error(id, &e),
    };

    match execute(disklet, operation) {
        Ok(result) => Response::success(id, result),
        Err(err) => {
            handle_error(name, &err);
            Response::from_storage_error(id, &err)
        }
    }
}

/// A command after boundary decoding; binary payloads are raw bytes from here on
enum Operation {
    Delete(String),
    GetData(String),
    GetText(String),
    List(String),
    DeepList(String),
    SetData(String, Vec<u8>),
    SetText(String, String),
}

impl Operation {
    fn decode(command: Command) -> Result<Self, ProtocolError> {
        Ok(match command {
            Command::Delete { path } => Operation::Delete(path),
            Command::GetData { path } => Operation::GetData(path),
            Command::GetText { path } => Operation::GetText(path),
            Command::List { path } => Operation::List(path),
            Command::DeepList { path } => Operation::DeepList(path),
            Command::SetData { path, data } => Operation::SetData(path, decode_data(&data)?),
            Command::SetText { path, text } => Operation::SetText(path, text),
        })
    }
}

fn execute<D: Disklet + ?Sized>(disklet: &D, operation: Operation) -> Result<Value, StorageError> {
    match operation {
        Operation::Delete(path) => disklet.delete(&path).map(|_| Value::Null),
        Operation::GetData(path) => disklet
            .get_data(&path)
            .map(|data| Value::String(encode_data(&data))),
        Operation::GetText(path) => disklet.get_text(&path).map(Value::String),
        Operation::List(path) => listing_value(disklet.list(&path)?),
        Operation::DeepList(path) => listing_value(deep_list(disklet, &path)?),
        Operation::SetData(path, data) => disklet.set_data(&path, &data).map(|_| Value::Null),
        Operation::SetText(path, text) => disklet.set_text(&path, &text).map(|_| Value::Null),
    }
}

fn listing_value(listing: Listing) -> Result<Value, StorageError> {
    serde_json::to_value(listing).map_err(|e| StorageError::IoFailure(e.into()))
}
