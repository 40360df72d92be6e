//! Request parsing
//!
//! Frames newline-delimited request lines off a byte stream and parses them.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::ProtocolError;
use crate::protocol::commands::Request;

/// Outcome of reading one request line
#[derive(Debug, PartialEq)]
pub enum LineRead {
    /// Stream closed with nothing buffered
    Eof,
    /// A complete line, without its `\n`, is in the buffer
    Line,
    /// The line passed the limit after `length` bytes. `terminated` is false
    /// while the rest of it is still unread.
    TooLong { length: usize, terminated: bool },
}

/// Reads one line into `buf`, never buffering more than `max_length` bytes.
///
/// Bytes are kept raw; UTF-8 is checked by [`parse_line`]. A final line
/// without a newline is returned as a line.
pub async fn read_request_line<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_length: usize,
) -> io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if buf.is_empty() { LineRead::Eof } else { LineRead::Line });
        }

        let (chunk, used, terminated) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (&available[..pos], pos + 1, true),
            None => (available, available.len(), false),
        };

        let length = buf.len() + chunk.len();
        if length > max_length {
            reader.consume(used);
            buf.clear();
            return Ok(LineRead::TooLong { length, terminated });
        }

        buf.extend_from_slice(chunk);
        reader.consume(used);
        if terminated {
            return Ok(LineRead::Line);
        }
    }
}

/// Drops input up to and including the next newline, or to end of stream.
pub async fn discard_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(());
            }
            None => {
                let used = available.len();
                reader.consume(used);
            }
        }
    }
}

/// Parses a raw request line, rejecting bytes that are not UTF-8.
pub fn parse_line(line: &[u8], max_length: usize) -> Result<Request, ProtocolError> {
    let text = std::str::from_utf8(line)
        .map_err(|_| ProtocolError::MalformedRequest("request is not valid UTF-8".into()))?;
    parse_request(text, max_length)
}

/// Parses one request line.
///
/// Lines over `max_length` bytes are rejected before any JSON work.
pub fn parse_request(line: &str, max_length: usize) -> Result<Request, ProtocolError> {
    if line.len() > max_length {
        return Err(ProtocolError::RequestTooLong {
            length: line.len(),
            limit: max_length,
        });
    }

    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        return Err(ProtocolError::MalformedRequest("empty request".into()));
    }

    Ok(serde_json::from_str(trimmed)?)
}

/// Best-effort recovery of the request id from a line that failed to parse
pub fn recover_id(line: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(line)
        .ok()?
        .get("id")?
        .as_u64()
}
