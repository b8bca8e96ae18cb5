//! Addressing of remote resources.
//!
//! Callers name resources with paths relative to a configured root. This module
//! turns those paths into absolute URIs, strips the root back off URIs returned
//! by the server, and swaps between the logical `webdav://` scheme used by
//! callers and the `http://` scheme the transport speaks.

mod root_location;
mod scheme;

pub use root_location::{InvalidLocation, RootLocation, combine, parent_of};
pub use scheme::{LOGICAL_SCHEME, TRANSPORT_SCHEME, to_logical_scheme, to_transport_scheme};
