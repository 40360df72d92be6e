//! Base64 transcoding for binary payloads
//!
//! The store works on raw bytes; only the wire carries base64.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::ProtocolError;

pub fn encode_data(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode_data(encoded: &str) -> Result<Vec<u8>, ProtocolError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| ProtocolError::InvalidBase64(e.to_string()))
}
