use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, warn};

use super::dav_resource::Resource;
use super::existence::Existence;
use crate::directory::{DavError, DirectoryRepository, Result};
use crate::metadata::{MetadataOutcome, MetadataSlot};
use crate::transport::ByteStream;

/// A path bound to a repository, with its metadata fetched at most once.
///
/// The memoized metadata is a snapshot taken on first use. Mutations through
/// the handle do not refresh it; use [`ResourceHandle::clone_with_path`] to get
/// a handle with an empty cache.
pub struct ResourceHandle {
    repository: Arc<DirectoryRepository>,
    path: String,
    metadata: MetadataSlot,
}

impl ResourceHandle {
    pub fn new(repository: Arc<DirectoryRepository>, path: impl Into<String>) -> Self {
        Self {
            repository,
            path: path.into(),
            metadata: MetadataSlot::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn repository(&self) -> &Arc<DirectoryRepository> {
        &self.repository
    }

    /// A handle for `path` on the same repository, with its own empty cache.
    pub fn clone_with_path(&self, path: impl Into<String>) -> Self {
        Self::new(self.repository.clone(), path)
    }

    /// The memoized metadata outcome, fetching it on first call.
    ///
    /// Concurrent first callers share a single fetch.
    pub async fn metadata(&self) -> &MetadataOutcome {
        self.metadata
            .get_or_fetch(|| self.repository.fetch_metadata(&self.path))
            .await
    }

    pub async fn existence(&self) -> Existence {
        Existence::classify(self.metadata().await, self.path.ends_with('/'))
    }
}

#[async_trait]
impl Resource for ResourceHandle {
    fn name(&self) -> &str {
        &self.path
    }

    async fn exists(&self) -> bool {
        self.metadata()
            .await
            .metadata()
            .is_some_and(|metadata| metadata.content_type.is_some())
    }

    async fn is_directory(&self) -> bool {
        self.existence().await == Existence::Directory
    }

    async fn children(&self) -> Result<Vec<String>> {
        match self.existence().await {
            Existence::Directory => match self.repository.get_children(&self.path).await {
                Ok(children) => Ok(children),
                Err(e @ DavError::InvalidLocation(_)) => Err(e),
                Err(e) => {
                    error!(path = %self.path, error = %e, "failed to list children");
                    Ok(Vec::new())
                }
            },
            Existence::File => {
                error!(path = %self.path, "cannot list children of a file");
                Ok(Vec::new())
            }
            Existence::Absent => {
                error!(path = %self.path, "cannot list children of a missing directory");
                Ok(Vec::new())
            }
        }
    }

    async fn last_modified(&self) -> i64 {
        match self.metadata().await {
            MetadataOutcome::Found(metadata) => metadata.modified_millis().unwrap_or(0),
            MetadataOutcome::NotFound => 0,
            MetadataOutcome::Failed(e) => {
                warn!(path = %self.path, error = %e, "no modification time");
                0
            }
        }
    }

    async fn content_length(&self) -> i64 {
        match self.metadata().await {
            MetadataOutcome::Found(metadata) => metadata
                .content_length
                .and_then(|len| i64::try_from(len).ok())
                .unwrap_or(-1),
            MetadataOutcome::NotFound => -1,
            MetadataOutcome::Failed(e) => {
                warn!(path = %self.path, error = %e, "no content length");
                -1
            }
        }
    }

    async fn open_stream(&self) -> Result<Option<ByteStream>> {
        if !self.exists().await {
            return Ok(None);
        }
        self.repository.open_stream(&self.path).await.map(Some)
    }

    async fn put_from_stream(&self, content: ByteStream) -> Result<()> {
        self.repository.put_resource(&self.path, content).await
    }

    async fn delete(&self) -> Result<()> {
        match self.existence().await {
            Existence::File => self.repository.delete_file(&self.path).await,
            Existence::Directory => self.repository.delete_directory(&self.path).await,
            Existence::Absent => {
                error!(path = %self.path, "cannot delete a missing resource");
                Ok(())
            }
        }
    }

    fn sibling(&self, path: &str) -> Box<dyn Resource> {
        Box::new(self.clone_with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use bytes::Bytes;
    use futures::TryStreamExt;

    use crate::location::RootLocation;
    use crate::transport::{DavTransport, MemoryTransport, TransportCall, TransportError};

    fn setup(transport: MemoryTransport) -> (Arc<MemoryTransport>, Arc<DirectoryRepository>) {
        let transport = Arc::new(transport);
        transport.add_container("http://my.server/");
        transport.add_container("http://my.server/hello/");
        transport.add_item("http://my.server/hello/world", "text/xml", vec![7u8; 1024]);
        let dyn_transport: Arc<dyn DavTransport> = transport.clone();
        let repository = Arc::new(DirectoryRepository::new(
            RootLocation::new("webdav://my.server"),
            dyn_transport,
        ));
        (transport, repository)
    }

    fn metadata_calls(transport: &MemoryTransport) -> usize {
        transport
            .calls()
            .iter()
            .filter(|call| matches!(call, TransportCall::FetchMetadata(_)))
            .count()
    }

    fn content(data: &'static [u8]) -> ByteStream {
        let chunk: std::result::Result<Bytes, TransportError> = Ok(Bytes::from_static(data));
        Box::pin(futures::stream::iter(vec![chunk]))
    }

    #[tokio::test]
    async fn test_file_metadata_is_fetched_once() {
        let (transport, repository) = setup(MemoryTransport::new());
        let handle = ResourceHandle::new(repository, "/hello/world");

        assert!(handle.exists().await);
        assert!(!handle.is_directory().await);
        assert_eq!(handle.content_length().await, 1024);
        assert!(handle.last_modified().await > 0);
        assert_eq!(metadata_calls(&transport), 1);
    }

    #[tokio::test]
    async fn test_missing_resource_sentinels() {
        let (transport, repository) = setup(MemoryTransport::new());
        let handle = ResourceHandle::new(repository, "/hello/missing");

        assert!(!handle.exists().await);
        assert_eq!(handle.content_length().await, -1);
        assert_eq!(handle.last_modified().await, 0);
        assert!(handle.open_stream().await.unwrap().is_none());
        assert_eq!(metadata_calls(&transport), 1);
    }

    #[tokio::test]
    async fn test_failed_fetch_sentinels() {
        let (transport, repository) = setup(MemoryTransport::new());
        transport.fail(
            "http://my.server/hello/broken",
            TransportError::status(500, "internal error"),
        );
        let handle = ResourceHandle::new(repository, "/hello/broken");

        assert!(!handle.exists().await);
        assert_eq!(handle.existence().await, Existence::Absent);
        assert_eq!(handle.content_length().await, -1);
        assert_eq!(handle.last_modified().await, 0);
        assert_eq!(metadata_calls(&transport), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_fetch() {
        let (transport, repository) =
            setup(MemoryTransport::new().with_latency(Duration::from_millis(50)));
        let handle = Arc::new(ResourceHandle::new(repository, "/hello/missing"));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move { handle.exists().await }));
        }
        for task in tasks {
            assert!(!task.await.unwrap());
        }

        assert_eq!(metadata_calls(&transport), 1);
        assert_eq!(handle.metadata().await, &MetadataOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_separate_handles_fetch_separately() {
        let (transport, repository) = setup(MemoryTransport::new());
        let first = ResourceHandle::new(repository, "/hello/world");
        let second = first.clone_with_path("/hello/world");

        assert!(first.exists().await);
        assert!(second.exists().await);
        assert_eq!(metadata_calls(&transport), 2);
    }

    #[tokio::test]
    async fn test_children_of_directory() {
        let (_transport, repository) = setup(MemoryTransport::new());

        let container = ResourceHandle::new(repository.clone(), "/hello/");
        assert!(container.is_directory().await);
        assert_eq!(container.children().await.unwrap(), vec!["hello/world"]);

        // Item-shaped probe of a container is redirected.
        let redirected = ResourceHandle::new(repository, "/hello");
        assert!(redirected.is_directory().await);
        assert!(!redirected.exists().await);
        assert_eq!(redirected.children().await.unwrap(), vec!["hello/world"]);
    }

    #[tokio::test]
    async fn test_children_listing_failure_is_empty() {
        let (transport, repository) = setup(MemoryTransport::new());
        transport.fail(
            "http://my.server/hello/",
            TransportError::status(500, "internal error"),
        );
        let handle = ResourceHandle::new(repository, "/hello");

        assert_eq!(handle.existence().await, Existence::Directory);
        assert!(handle.children().await.unwrap().is_empty());
        assert!(
            transport
                .calls()
                .contains(&TransportCall::List("http://my.server/hello/".to_string()))
        );
    }

    #[tokio::test]
    async fn test_children_of_file_or_missing_is_empty() {
        let (transport, repository) = setup(MemoryTransport::new());

        let file = ResourceHandle::new(repository.clone(), "/hello/world");
        assert!(file.children().await.unwrap().is_empty());

        let missing = ResourceHandle::new(repository, "/nope/");
        assert!(missing.children().await.unwrap().is_empty());

        assert!(
            !transport
                .calls()
                .iter()
                .any(|call| matches!(call, TransportCall::List(_)))
        );
    }

    #[tokio::test]
    async fn test_open_stream() {
        let (_transport, repository) = setup(MemoryTransport::new());
        let handle = ResourceHandle::new(repository, "/hello/world");

        let stream = handle.open_stream().await.unwrap().unwrap();
        let chunks: Vec<Bytes> = stream.try_collect().await.unwrap();
        assert_eq!(chunks.concat(), vec![7u8; 1024]);
    }

    #[tokio::test]
    async fn test_put_from_stream() {
        let (transport, repository) = setup(MemoryTransport::new());
        let handle = ResourceHandle::new(repository, "/hello/new/artifact.txt");

        handle.put_from_stream(content(b"payload")).await.unwrap();

        assert!(transport.contains("http://my.server/hello/new/"));
        assert_eq!(
            transport.content("http://my.server/hello/new/artifact.txt"),
            Some(Bytes::from_static(b"payload"))
        );

        let fresh = handle.clone_with_path(handle.path());
        assert_eq!(fresh.content_length().await, 7);
    }

    #[tokio::test]
    async fn test_delete_dispatches_on_existence() {
        let (transport, repository) = setup(MemoryTransport::new());
        transport.add_container("http://my.server/hello/sub/");

        ResourceHandle::new(repository.clone(), "/hello/world")
            .delete()
            .await
            .unwrap();
        ResourceHandle::new(repository.clone(), "/hello/sub")
            .delete()
            .await
            .unwrap();
        ResourceHandle::new(repository, "/hello/missing")
            .delete()
            .await
            .unwrap();

        let deletes: Vec<TransportCall> = transport
            .calls()
            .into_iter()
            .filter(|call| matches!(call, TransportCall::Delete(_)))
            .collect();
        assert_eq!(
            deletes,
            vec![
                TransportCall::Delete("http://my.server/hello/world".to_string()),
                TransportCall::Delete("http://my.server/hello/sub/".to_string()),
            ]
        );
        assert!(!transport.contains("http://my.server/hello/sub/"));
    }

    #[tokio::test]
    async fn test_sibling() {
        let (_transport, repository) = setup(MemoryTransport::new());
        let handle = ResourceHandle::new(repository, "/hello/missing");

        let sibling = handle.sibling("/hello/world");
        assert_eq!(sibling.name(), "/hello/world");
        assert!(sibling.exists().await);
    }
}
