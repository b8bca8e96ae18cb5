use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::debug;

use super::error::{DavError, Result};
use crate::config::RepositoryConfig;
use crate::location::{RootLocation, parent_of, to_logical_scheme, to_transport_scheme};
use crate::metadata::{MetadataOutcome, ResourceMetadata};
use crate::transport::{ByteStream, Credentials, DavTransport, HttpTransport};

/// Path-based access to a WebDAV share rooted at one location.
///
/// Holds no state beyond the root and the transport, so a single instance can
/// back any number of resource handles.
pub struct DirectoryRepository {
    root: RootLocation,
    transport: Arc<dyn DavTransport>,
}

impl DirectoryRepository {
    pub fn new(root: RootLocation, transport: Arc<dyn DavTransport>) -> Self {
        Self { root, transport }
    }

    /// Build a repository talking HTTP to the configured root.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        let credentials = config.username.as_ref().map(|username| Credentials {
            username: username.clone(),
            password: config.password.clone(),
        });
        let transport = HttpTransport::new(credentials, config.timeout)
            .map_err(|e| DavError::transport("create client", config.root.as_str(), e))?;
        Ok(Self::new(config.root.clone(), Arc::new(transport)))
    }

    pub fn root(&self) -> &RootLocation {
        &self.root
    }

    fn item_url(&self, path: &str) -> String {
        to_transport_scheme(&self.root.item_uri(path))
    }

    fn path_url(&self, path: &str) -> String {
        to_transport_scheme(&self.root.path_uri(path))
    }

    /// List the immediate children of a container.
    ///
    /// Returns root-relative paths; containers keep their trailing `/`. The
    /// container's own entry is skipped.
    pub async fn get_children(&self, path: &str) -> Result<Vec<String>> {
        let url = self.path_url(path);
        let entries = self
            .transport
            .list(&url)
            .await
            .map_err(|e| DavError::transport("list", &url, e))?;

        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.is_current_directory {
                continue;
            }
            children.push(self.root.strip_root(&to_logical_scheme(&entry.url))?);
        }
        Ok(children)
    }

    /// Fetch the metadata of `path`, rendered as an item.
    ///
    /// Never fails: not-found and transport failures are reported as outcomes.
    pub async fn fetch_metadata(&self, path: &str) -> MetadataOutcome {
        let url = self.item_url(path);
        self.transport.fetch_metadata(&url).await.into()
    }

    /// Fetch the metadata of `path`. `None` means the server answered 404;
    /// any other failure is an error.
    pub async fn get_metadata(&self, path: &str) -> Result<Option<ResourceMetadata>> {
        match self.fetch_metadata(path).await {
            MetadataOutcome::Found(metadata) => Ok(Some(metadata)),
            MetadataOutcome::NotFound => Ok(None),
            MetadataOutcome::Failed(e) => {
                Err(DavError::transport("fetch metadata", self.item_url(path), e))
            }
        }
    }

    /// Open a stream over an item's content.
    ///
    /// The stream holds the response open until it is dropped.
    pub async fn open_stream(&self, path: &str) -> Result<ByteStream> {
        let url = self.item_url(path);
        self.transport
            .open_read(&url)
            .await
            .map_err(|e| DavError::transport("read", url, e))
    }

    /// Whether `path` exists, probed as an item.
    pub async fn exists_item(&self, path: &str) -> Result<bool> {
        self.exists_at(self.item_url(path)).await
    }

    /// Whether `path` exists, probed as a container.
    pub async fn exists_path(&self, path: &str) -> Result<bool> {
        self.exists_at(self.path_url(path)).await
    }

    /// Only a 404 means absent. Any other status usually means the path is
    /// there but refused or redirected the request. A failure without a status
    /// tells nothing about the path and is propagated.
    async fn exists_at(&self, url: String) -> Result<bool> {
        match self.transport.list(&url).await {
            Ok(entries) => Ok(!entries.is_empty()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => match e.status {
                Some(status) => {
                    debug!(url = %url, status, message = %e.message, "existence probe failed, assuming present");
                    Ok(true)
                }
                None => Err(DavError::transport("list", url, e)),
            },
        }
    }

    /// Make sure the container `path` exists, creating missing ancestors
    /// top-down.
    ///
    /// A container is only ever created once its parent is known to exist.
    /// The level below the root is created directly, since the root itself is
    /// assumed to exist. Transport failures abort the whole operation; nothing
    /// is retried.
    pub fn ensure_path_exists<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            if self.exists_path(path).await? {
                debug!(path, "container exists");
                return Ok(true);
            }
            debug!(path, "container does not exist");

            if let Some(parent) = parent_of(path) {
                if !self.ensure_path_exists(parent).await? {
                    return Ok(false);
                }
            }

            let url = self.path_url(path);
            self.transport
                .create_container(&url)
                .await
                .map_err(|e| DavError::transport("create container", &url, e))?;
            debug!(url = %url, "created container");
            Ok(true)
        })
    }

    /// Upload `content` to the item `path`, creating its parent containers
    /// first.
    ///
    /// Fails with [`DavError::NoParent`] for paths directly at the root.
    pub async fn put_resource(&self, path: &str, content: ByteStream) -> Result<()> {
        let parent = parent_of(path).ok_or_else(|| DavError::NoParent(path.to_string()))?;
        if !self.ensure_path_exists(parent).await? {
            return Err(DavError::ContainerNotCreated(path.to_string()));
        }

        let url = self.item_url(path);
        self.transport
            .upload(&url, content)
            .await
            .map_err(|e| DavError::transport("upload", url, e))
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        self.delete_url(self.item_url(path)).await
    }

    pub async fn delete_directory(&self, path: &str) -> Result<()> {
        self.delete_url(self.path_url(path)).await
    }

    async fn delete_url(&self, url: String) -> Result<()> {
        self.transport
            .delete(&url)
            .await
            .map_err(|e| DavError::transport("delete", url, e))
    }
}
