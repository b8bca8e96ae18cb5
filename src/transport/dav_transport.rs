use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;

/// Content type the server reports for containers.
pub const DIRECTORY_CONTENT_TYPE: &str = "httpd/unix-directory";

/// A stream of content bytes read from or written to the server.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// A failed transport call.
///
/// `status` carries the HTTP status when the server answered. It is `None` when
/// no status was received at all (connection refused, timeout, broken body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    /// An error carrying an HTTP status.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// An error that never got as far as an HTTP status.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Moved permanently. Servers answer this when a container is requested
    /// without a trailing `/` or an item with one.
    pub fn is_redirect(&self) -> bool {
        matches!(self.status, Some(301) | Some(308))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => TransportError::status(status.as_u16(), e.to_string()),
            None => TransportError::other(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// One resource as reported by a listing or metadata fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavEntry {
    /// Absolute URL in the transport scheme.
    pub url: String,
    /// Set on the entry describing the listed container itself.
    pub is_current_directory: bool,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

/// The operations the directory repository needs from a WebDAV client.
///
/// All URLs are absolute and in the transport scheme. Failures carry the HTTP
/// status where there is one; 404 means not found and 301 means the resource
/// exists under the other trailing-slash form.
#[async_trait]
pub trait DavTransport: Send + Sync {
    /// List a resource and its immediate children.
    ///
    /// For a container the result holds the container itself (flagged with
    /// `is_current_directory`) followed by its children. For an item it holds
    /// just the item.
    async fn list(&self, url: &str) -> Result<Vec<DavEntry>>;

    /// Fetch the properties of a single resource.
    async fn fetch_metadata(&self, url: &str) -> Result<DavEntry>;

    /// Open a stream over an item's content.
    async fn open_read(&self, url: &str) -> Result<ByteStream>;

    /// Write an item, replacing any previous content.
    async fn upload(&self, url: &str, content: ByteStream) -> Result<()>;

    /// Create a container. The parent container must already exist.
    async fn create_container(&self, url: &str) -> Result<()>;

    /// Delete an item or a container with everything below it.
    async fn delete(&self, url: &str) -> Result<()>;
}
