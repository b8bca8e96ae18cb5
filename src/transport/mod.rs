//! The WebDAV transport capability.
//!
//! [`DavTransport`] is the narrow interface the directory repository needs from
//! a WebDAV client: list, stat, read, upload, create a container, delete. Two
//! implementations are provided:
//!
//! - [`HttpTransport`] - talks to a real server over HTTP with `reqwest`
//! - [`MemoryTransport`] - an in-memory tree, intended primarily for testing

mod dav_transport;
mod http_transport;
mod memory_transport;
mod propfind;

pub use dav_transport::{
    ByteStream, DIRECTORY_CONTENT_TYPE, DavEntry, DavTransport, Result, TransportError,
};
pub use http_transport::{Credentials, HttpTransport};
pub use memory_transport::{MemoryTransport, TransportCall};
