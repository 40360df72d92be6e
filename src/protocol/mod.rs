//! Disklet wire protocol
//!
//! JSON-lines boundary adapter: request parsing, base64 transcoding,
//! dispatch onto a disklet, and response formatting.

pub mod codec;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::{Command, Request};
pub use handlers::handle_request;
pub use parser::{LineRead, discard_line, parse_line, parse_request, read_request_line, recover_id};
pub use responses::{ErrorBody, Response};
