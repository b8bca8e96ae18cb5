use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::{StreamExt, stream};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

use crate::config::RepositoryConfig;
use crate::directory::{DavError, DirectoryRepository, Result};
use crate::resource::{Resource, ResourceHandle};
use crate::transport::{ByteStream, TransportError};

/// Uploads read local files in chunks of this size.
pub const UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

const DEFAULT_HIDDEN_PREFIX: &str = ".";

/// File-level operations for publishing and retrieving artifacts.
///
/// Every call works on a fresh [`ResourceHandle`], so nothing observed by one
/// call leaks into the next.
pub struct ArtifactRepository {
    repository: Arc<DirectoryRepository>,
    username: Option<String>,
    hidden_prefix: String,
}

impl ArtifactRepository {
    pub fn new(repository: Arc<DirectoryRepository>) -> Self {
        Self {
            repository,
            username: None,
            hidden_prefix: DEFAULT_HIDDEN_PREFIX.to_string(),
        }
    }

    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        let repository = DirectoryRepository::from_config(config)?;
        Ok(Self {
            repository: Arc::new(repository),
            username: config.username.clone(),
            hidden_prefix: config.hidden_prefix.clone(),
        })
    }

    /// Entries whose final segment starts with `prefix` are left out of
    /// listings. An empty prefix hides nothing.
    pub fn with_hidden_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hidden_prefix = prefix.into();
        self
    }

    /// The user shown by [`ArtifactRepository::display_name`].
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn resource(&self, path: &str) -> ResourceHandle {
        ResourceHandle::new(self.repository.clone(), path)
    }

    /// Copy the remote item at `path` into `destination`, returning the number
    /// of bytes written.
    pub async fn get(&self, path: &str, destination: &Path) -> Result<u64> {
        let source = self.resource(path);
        let mut stream = source
            .open_stream()
            .await?
            .ok_or_else(|| DavError::NotFound(path.to_string()))?;

        let mut file = File::create(destination).await?;
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                DavError::transport("read", self.repository.root().item_uri(path), e)
            })?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        debug!(path, destination = %destination.display(), bytes = written, "downloaded");
        Ok(written)
    }

    /// The children of `path`, minus hidden entries.
    pub async fn list(&self, path: &str) -> Result<Vec<String>> {
        let children = self.resource(path).children().await?;
        Ok(children
            .into_iter()
            .filter(|child| !self.is_hidden(child))
            .collect())
    }

    fn is_hidden(&self, path: &str) -> bool {
        !self.hidden_prefix.is_empty() && final_segment(path).starts_with(&self.hidden_prefix)
    }

    /// Upload the local file `source` to `path`.
    ///
    /// Fails with [`DavError::AlreadyExists`] if something is already there and
    /// `overwrite` is not set.
    pub async fn put(&self, source: &Path, path: &str, overwrite: bool) -> Result<()> {
        let destination = self.resource(path);
        if destination.existence().await.exists() && !overwrite {
            return Err(DavError::AlreadyExists(path.to_string()));
        }

        let file = File::open(source).await?;
        destination.put_from_stream(file_chunks(file)).await?;
        debug!(path, source = %source.display(), "uploaded");
        Ok(())
    }

    /// Create the directory `path` and any missing ancestors.
    pub async fn make_directory(&self, path: &str) -> Result<()> {
        if self.repository.ensure_path_exists(path).await? {
            Ok(())
        } else {
            Err(DavError::ContainerNotCreated(path.to_string()))
        }
    }

    /// Delete `path`, whether it is a file or a directory.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let resource = self.resource(path);
        if !resource.existence().await.exists() {
            return Err(DavError::NotFound(path.to_string()));
        }
        resource.delete().await
    }

    /// A printable location for `path` that never includes the password.
    pub fn display_name(&self, path: &str) -> String {
        let path = path.strip_prefix('/').unwrap_or(path);
        let root = self.repository.root();
        match &self.username {
            Some(user) => format!("[{}/******* @ {}] /{}", user, root, path),
            None => format!("[{}] /{}", root, path),
        }
    }
}

/// The last segment of `path`, ignoring a trailing `/`.
fn final_segment(path: &str) -> &str {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Read `file` lazily in chunks of at most [`UPLOAD_CHUNK_SIZE`].
fn file_chunks(file: File) -> ByteStream {
    Box::pin(stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; UPLOAD_CHUNK_SIZE];
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| TransportError::other(format!("failed to read local file: {}", e)))?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        Ok::<_, TransportError>(Some((Bytes::from(buf), file)))
    }))
}
