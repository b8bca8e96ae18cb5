use thiserror::Error;

use crate::location::InvalidLocation;
use crate::transport::TransportError;

/// Errors returned by repository and resource operations.
#[derive(Debug, Error)]
pub enum DavError {
    #[error("not found: {0}")]
    NotFound(String),

    /// The server returned a URI outside the configured root.
    #[error(transparent)]
    InvalidLocation(#[from] InvalidLocation),

    #[error("{0} has no parent container; writing at the repository root is not supported")]
    NoParent(String),

    #[error("could not create container for {0}")]
    ContainerNotCreated(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{operation} failed for {uri}: {source}")]
    Transport {
        operation: &'static str,
        uri: String,
        source: TransportError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DavError {
    pub(crate) fn transport(
        operation: &'static str,
        uri: impl Into<String>,
        source: TransportError,
    ) -> Self {
        DavError::Transport {
            operation,
            uri: uri.into(),
            source,
        }
    }

    /// The HTTP status behind a transport failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DavError::Transport { source, .. } => source.status,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DavError>;
