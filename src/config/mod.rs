//! Configuration module.

mod config_helper;
mod read_config;
mod types;

pub use read_config::{ConfigError, ConfigResult, ConfigSource, read_config};
pub use types::{Config, ListingConfig, NetworkConfig, RepositoryConfig, RepositoryEntry};
