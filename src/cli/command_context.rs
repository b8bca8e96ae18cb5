//! Command context for CLI commands.
//!
//! Reads the layered configuration once and opens the repository named by
//! `--repository`.

use thiserror::Error;
use tracing::{debug, warn};

use crate::cli::GlobalArgs;
use crate::config::{Config, ConfigError, read_config};
use crate::directory::DavError;
use crate::repository::ArtifactRepository;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during command context creation.
#[derive(Debug, Error)]
pub enum CommandContextError {
    /// Repository is required but was not specified.
    #[error("repository is required: pass --repository <name|url>")]
    RepositoryRequired,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The repository could not be opened.
    #[error("{0}")]
    Dav(#[from] DavError),
}

/// Result type for command context operations.
pub type Result<T> = std::result::Result<T, CommandContextError>;

// =============================================================================
// CommandContext
// =============================================================================

/// Resolved command context.
pub struct CommandContext {
    /// Resolved configuration.
    pub config: Config,
    /// The opened repository.
    pub repository: ArtifactRepository,
    /// Format output as JSON.
    pub json: bool,
}

impl CommandContext {
    /// Read configuration and open the repository selected by `global`.
    pub fn new(global: &GlobalArgs) -> Result<Self> {
        let result = read_config(&global.to_config_source())?;
        for warning in &result.warnings {
            warn!("{}", warning);
        }

        let spec = global
            .repository
            .as_deref()
            .ok_or(CommandContextError::RepositoryRequired)?;
        let repository_config = result.config.repository(spec)?;
        debug!(repository = %repository_config.root, "opening repository");
        let repository = ArtifactRepository::from_config(&repository_config)?;

        Ok(Self {
            config: result.config,
            repository,
            json: global.json,
        })
    }
}
