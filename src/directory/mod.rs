//! The transport-facing repository facade.
//!
//! [`DirectoryRepository`] resolves relative paths against the configured root
//! and maps each operation onto the [`DavTransport`](crate::transport::DavTransport)
//! capability, translating transport failures into [`DavError`].

mod directory_repository;
mod error;

pub use directory_repository::DirectoryRepository;
pub use error::{DavError, Result};
