use chrono::{DateTime, Utc};

use crate::transport::{DIRECTORY_CONTENT_TYPE, DavEntry, TransportError};

/// Attributes the server reports for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceMetadata {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
    pub modified_at: Option<DateTime<Utc>>,
}

impl ResourceMetadata {
    /// Whether the content type is the directory marker.
    pub fn is_directory(&self) -> bool {
        self.content_type.as_deref() == Some(DIRECTORY_CONTENT_TYPE)
    }

    /// Modification time in milliseconds since the Unix epoch, if known.
    pub fn modified_millis(&self) -> Option<i64> {
        self.modified_at.map(|t| t.timestamp_millis())
    }
}

impl From<DavEntry> for ResourceMetadata {
    fn from(entry: DavEntry) -> Self {
        Self {
            content_type: entry.content_type,
            content_length: entry.content_length,
            created_at: entry.created_at,
            modified_at: entry.modified_at,
        }
    }
}

/// The outcome of a single metadata fetch.
///
/// Not-found is a regular outcome, not an error, so that it can be memoized
/// like any other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataOutcome {
    Found(ResourceMetadata),
    NotFound,
    /// Any transport failure other than not-found, status included.
    Failed(TransportError),
}

impl MetadataOutcome {
    /// The metadata, if the resource was found.
    pub fn metadata(&self) -> Option<&ResourceMetadata> {
        match self {
            MetadataOutcome::Found(metadata) => Some(metadata),
            _ => None,
        }
    }
}

impl From<std::result::Result<DavEntry, TransportError>> for MetadataOutcome {
    fn from(result: std::result::Result<DavEntry, TransportError>) -> Self {
        match result {
            Ok(entry) => MetadataOutcome::Found(entry.into()),
            Err(e) if e.is_not_found() => MetadataOutcome::NotFound,
            Err(e) => MetadataOutcome::Failed(e),
        }
    }
}
