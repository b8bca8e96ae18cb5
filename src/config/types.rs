//! Configuration types for davstore-rs.
//!
//! `Config` mirrors the INI file. `RepositoryConfig` is the immutable, fully
//! resolved form handed to [`DirectoryRepository::from_config`](crate::directory::DirectoryRepository::from_config).

use std::collections::HashMap;
use std::time::Duration;

use crate::location::RootLocation;

// =============================================================================
// Config Sections
// =============================================================================

/// [network] section - settings for every HTTP connection.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

/// [listing] section.
#[derive(Debug, Clone)]
pub struct ListingConfig {
    /// Children whose final segment starts with this prefix are not listed.
    pub hidden_prefix: String,
}

/// [repository.{name}] section - a named WebDAV share.
#[derive(Clone, Default)]
pub struct RepositoryEntry {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for RepositoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryEntry")
            .field("url", &self.url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub network: NetworkConfig,
    pub listing: ListingConfig,
    pub repositories: HashMap<String, RepositoryEntry>,
}

// =============================================================================
// Resolved Repository
// =============================================================================

/// Everything needed to open one repository.
#[derive(Clone)]
pub struct RepositoryConfig {
    pub root: RootLocation,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub hidden_prefix: String,
}

impl std::fmt::Debug for RepositoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryConfig")
            .field("root", &self.root)
            .field("username", &self.username)
            .field("timeout", &self.timeout)
            .field("hidden_prefix", &self.hidden_prefix)
            .finish_non_exhaustive()
    }
}
