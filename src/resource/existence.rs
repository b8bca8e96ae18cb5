use tracing::error;

use crate::metadata::MetadataOutcome;

/// What a path turned out to be on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Directory,
    File,
    Absent,
}

impl Existence {
    /// Classify a metadata outcome.
    ///
    /// `probe_is_container` is the shape of the URI that was probed. A redirect
    /// means the path exists under the other shape: a container-shaped probe
    /// that was redirected points at a file, and vice versa. Any other failure
    /// is logged and treated as absent.
    pub fn classify(outcome: &MetadataOutcome, probe_is_container: bool) -> Existence {
        match outcome {
            MetadataOutcome::Found(metadata) if metadata.is_directory() => Existence::Directory,
            MetadataOutcome::Found(_) => Existence::File,
            MetadataOutcome::NotFound => Existence::Absent,
            MetadataOutcome::Failed(e) if e.is_redirect() => {
                if probe_is_container {
                    Existence::File
                } else {
                    Existence::Directory
                }
            }
            MetadataOutcome::Failed(e) => {
                error!(error = %e, "metadata fetch failed, treating resource as absent");
                Existence::Absent
            }
        }
    }

    pub fn exists(self) -> bool {
        self != Existence::Absent
    }
}
