//! Artifact-level operations over a WebDAV share.

mod artifact_repository;

pub use artifact_repository::{ArtifactRepository, UPLOAD_CHUNK_SIZE};
