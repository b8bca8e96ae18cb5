use async_trait::async_trait;

use crate::directory::Result;
use crate::transport::ByteStream;

/// Operations on a single remote path.
///
/// Read-only queries are advisory: they degrade to `false`, `0`, `-1` or an
/// empty listing rather than fail. Mutations propagate every failure.
#[async_trait]
pub trait Resource: Send + Sync {
    /// The path this resource is bound to, relative to the repository root.
    fn name(&self) -> &str;

    /// Whether the server reported a content type for this path.
    async fn exists(&self) -> bool;

    async fn is_directory(&self) -> bool;

    /// Root-relative paths of the immediate children.
    ///
    /// Empty, with an error logged, when this is not a directory.
    async fn children(&self) -> Result<Vec<String>>;

    /// Modification time in milliseconds since the epoch, or 0 if unknown.
    async fn last_modified(&self) -> i64;

    /// Content length in bytes, or -1 if unknown.
    async fn content_length(&self) -> i64;

    /// Open the content for reading, or `None` if the resource does not exist.
    async fn open_stream(&self) -> Result<Option<ByteStream>>;

    /// Replace the content, creating parent containers as needed.
    async fn put_from_stream(&self, content: ByteStream) -> Result<()>;

    /// Delete the resource as a file or a directory, whichever it is.
    ///
    /// Deleting an absent resource logs an error and does nothing.
    async fn delete(&self) -> Result<()>;

    /// A resource for `path` on the same repository.
    fn sibling(&self, path: &str) -> Box<dyn Resource>;
}
