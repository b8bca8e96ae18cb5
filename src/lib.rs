//! davstore-rs - Path-based access to WebDAV shares.
//!
//! A [`DirectoryRepository`] maps root-relative paths onto a
//! [`DavTransport`], and [`ResourceHandle`]s bind single paths to it with
//! memoized metadata. [`ArtifactRepository`] adds local-file transfers on top.

pub mod cli;
pub mod config;
pub mod directory;
pub mod location;
pub mod metadata;
pub mod repository;
pub mod resource;
pub mod transport;

pub use directory::{DavError, DirectoryRepository, Result};
pub use location::RootLocation;
pub use repository::ArtifactRepository;
pub use resource::{Existence, Resource, ResourceHandle};
pub use transport::{DavTransport, HttpTransport, MemoryTransport, TransportError};
