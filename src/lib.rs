//! Disklet: a path-addressed file store confined to one root folder,
//! served to clients over a JSON-lines protocol.

pub mod error;
pub mod middleware;
pub mod navigate;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod utils;

pub use error::{ProtocolError, ServerError, StorageError};
pub use server::Server;
pub use storage::{Disklet, EntryKind, FsDisklet, Listing, MemoryDisklet};
