//! Configuration file reading and parsing.
//!
//! This module handles locating, reading, and parsing INI-format configuration files,
//! with support for layered overrides.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use configparser::ini::Ini;
use thiserror::Error;

use super::{Config, ListingConfig, NetworkConfig, RepositoryEntry};

// =============================================================================
// Constants - Default Values
// =============================================================================

const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LISTING_HIDDEN_PREFIX: &str = ".";

const ENV_CONFIG_FILE: &str = "DAVSTORE_CONFIG_FILE";
const DEFAULT_CONFIG_FILENAME: &str = ".davstoreconfig";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid integer '{value}': {source}")]
    InvalidInteger {
        value: String,
        source: std::num::ParseIntError,
    },

    #[error("invalid override key '{key}': {message}")]
    InvalidOverrideKey { key: String, message: String },

    #[error("missing required field '{field}' in section '{section}'")]
    MissingRequiredField { section: String, field: String },

    #[error("no repository named '{0}' is configured")]
    UnknownRepository(String),
}

/// Result type for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// ConfigSource
// =============================================================================

/// Specifies how to locate and layer configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    /// Explicit config file path from CLI. If specified and doesn't exist, error.
    /// If None, fall back to DAVSTORE_CONFIG_FILE env var, then ~/.davstoreconfig.
    pub config_file: Option<PathBuf>,

    /// Additional override config file (layered on top of base config).
    pub override_file: Option<PathBuf>,

    /// Individual key=value overrides (applied last).
    /// Keys use dot-notation: "network.timeout_secs", "repository.myrepo.url"
    pub overrides: Vec<(String, String)>,
}

// =============================================================================
// Config File Resolution
// =============================================================================

/// Information about how the config file was resolved.
#[derive(Debug)]
struct ResolvedConfigFile {
    path: Option<PathBuf>,
    /// Set when the env var pointed to a nonexistent file.
    warning: Option<String>,
}

/// Resolve which config file to use based on the ConfigSource and environment.
fn resolve_config_file(source: &ConfigSource) -> Result<ResolvedConfigFile> {
    if let Some(ref path) = source.config_file {
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path.clone()),
                warning: None,
            });
        } else {
            return Err(ConfigError::FileNotFound(path.clone()));
        }
    }

    if let Ok(env_path) = env::var(ENV_CONFIG_FILE) {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(path),
                warning: None,
            });
        } else {
            // Warn but continue with defaults
            return Ok(ResolvedConfigFile {
                path: None,
                warning: Some(format!(
                    "config file specified by {} does not exist: {}",
                    ENV_CONFIG_FILE, env_path
                )),
            });
        }
    }

    if let Some(home) = home_dir() {
        let default_path = home.join(DEFAULT_CONFIG_FILENAME);
        if default_path.exists() {
            return Ok(ResolvedConfigFile {
                path: Some(default_path),
                warning: None,
            });
        }
    }

    Ok(ResolvedConfigFile {
        path: None,
        warning: None,
    })
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

// =============================================================================
// Default Config
// =============================================================================

/// Create a Config with all default values.
fn default_config() -> Config {
    Config {
        network: NetworkConfig {
            timeout_secs: DEFAULT_NETWORK_TIMEOUT_SECS,
        },
        listing: ListingConfig {
            hidden_prefix: DEFAULT_LISTING_HIDDEN_PREFIX.to_string(),
        },
        repositories: HashMap::new(),
    }
}

// =============================================================================
// INI Parsing
// =============================================================================

fn parse_u64(value: &str) -> Result<u64> {
    value.trim().parse().map_err(|e| ConfigError::InvalidInteger {
        value: value.to_string(),
        source: e,
    })
}

/// Apply an INI file's contents to a Config, layering on top of existing values.
fn apply_ini_to_config(config: &mut Config, ini: &Ini) -> Result<()> {
    // [network] section
    if let Some(timeout) = ini.get("network", "timeout_secs") {
        config.network.timeout_secs = parse_u64(&timeout)?;
    }

    // [listing] section
    if let Some(prefix) = ini.get("listing", "hidden_prefix") {
        config.listing.hidden_prefix = prefix;
    }

    // [repository.*] sections
    for section_name in ini.sections() {
        if let Some(repo_name) = section_name.strip_prefix("repository.") {
            let url =
                ini.get(&section_name, "url")
                    .ok_or_else(|| ConfigError::MissingRequiredField {
                        section: section_name.clone(),
                        field: "url".to_string(),
                    })?;

            let entry = RepositoryEntry {
                url,
                username: ini.get(&section_name, "username"),
                password: ini.get(&section_name, "password"),
            };

            config.repositories.insert(repo_name.to_string(), entry);
        }
    }

    Ok(())
}

/// Load and parse an INI file.
fn load_ini(path: &Path) -> Result<Ini> {
    let mut ini = Ini::new();
    ini.load(path).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e,
    })?;
    Ok(ini)
}

// =============================================================================
// Override Application
// =============================================================================

/// Apply a single key=value override to the config.
fn apply_override(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let parts: Vec<&str> = key.splitn(3, '.').collect();

    match parts.as_slice() {
        ["network", "timeout_secs"] => {
            config.network.timeout_secs = parse_u64(value)?;
            Ok(())
        }

        ["listing", "hidden_prefix"] => {
            config.listing.hidden_prefix = value.to_string();
            Ok(())
        }

        // repository.name.param
        ["repository", name, param] => apply_repository_override(config, name, param, value),

        ["network", _] | ["listing", _] => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unknown parameter".to_string(),
        }),

        _ => Err(ConfigError::InvalidOverrideKey {
            key: key.to_string(),
            message: "unrecognized key format".to_string(),
        }),
    }
}

fn apply_repository_override(
    config: &mut Config,
    name: &str,
    param: &str,
    value: &str,
) -> Result<()> {
    let repo = config.repositories.entry(name.to_string()).or_default();

    match param {
        "url" => repo.url = value.to_string(),
        "username" => repo.username = Some(value.to_string()),
        "password" => repo.password = Some(value.to_string()),
        _ => {
            return Err(ConfigError::InvalidOverrideKey {
                key: format!("repository.{}.{}", name, param),
                message: "unknown parameter".to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

/// Result of reading configuration, including any warnings.
#[derive(Debug)]
pub struct ConfigResult {
    /// The parsed configuration.
    pub config: Config,
    /// Any warnings generated during config loading.
    pub warnings: Vec<String>,
}

/// Read and parse configuration from the specified sources.
///
/// Configuration is layered in this order:
/// 1. Built-in defaults
/// 2. Base config file (from CLI, env var, or ~/.davstoreconfig)
/// 3. Override config file (if specified)
/// 4. Individual overrides (applied last)
pub fn read_config(source: &ConfigSource) -> Result<ConfigResult> {
    let mut warnings = Vec::new();

    let mut config = default_config();

    let resolved = resolve_config_file(source)?;
    if let Some(warning) = resolved.warning {
        warnings.push(warning);
    }
    if let Some(ref path) = resolved.path {
        let ini = load_ini(path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    if let Some(ref override_path) = source.override_file {
        if !override_path.exists() {
            return Err(ConfigError::FileNotFound(override_path.clone()));
        }
        let ini = load_ini(override_path)?;
        apply_ini_to_config(&mut config, &ini)?;
    }

    for (key, value) in &source.overrides {
        apply_override(&mut config, key, value)?;
    }

    Ok(ConfigResult { config, warnings })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.network.timeout_secs, 30);
        assert_eq!(config.listing.hidden_prefix, ".");
        assert!(config.repositories.is_empty());
    }

    #[test]
    fn test_apply_override_network() {
        let mut config = default_config();
        apply_override(&mut config, "network.timeout_secs", "120").unwrap();
        assert_eq!(config.network.timeout_secs, 120);

        assert!(matches!(
            apply_override(&mut config, "network.timeout_secs", "soon"),
            Err(ConfigError::InvalidInteger { .. })
        ));
        assert!(matches!(
            apply_override(&mut config, "network.retries", "3"),
            Err(ConfigError::InvalidOverrideKey { .. })
        ));
    }

    #[test]
    fn test_apply_override_repository() {
        let mut config = default_config();
        apply_override(&mut config, "repository.myrepo.url", "http://dav.local/repo").unwrap();
        apply_override(&mut config, "repository.myrepo.username", "deployer").unwrap();
        apply_override(&mut config, "repository.myrepo.password", "secret").unwrap();

        let repo = config.repositories.get("myrepo").unwrap();
        assert_eq!(repo.url, "http://dav.local/repo");
        assert_eq!(repo.username.as_deref(), Some("deployer"));
        assert_eq!(repo.password.as_deref(), Some("secret"));

        assert!(apply_override(&mut config, "repository.myrepo.region", "x").is_err());
        assert!(apply_override(&mut config, "bogus", "x").is_err());
    }

    #[test]
    fn test_parse_ini_config() {
        let mut ini = Ini::new();
        ini.read(
            r#"
[network]
timeout_secs = 10

[listing]
hidden_prefix = _

[repository.main]
url = webdav://dav.example.com/artifacts
username = deployer
password = secret

[repository.public]
url = http://mirror.example.com/
"#
            .to_string(),
        )
        .unwrap();

        let mut config = default_config();
        apply_ini_to_config(&mut config, &ini).unwrap();

        assert_eq!(config.network.timeout_secs, 10);
        assert_eq!(config.listing.hidden_prefix, "_");

        let main = config.repositories.get("main").unwrap();
        assert_eq!(main.url, "webdav://dav.example.com/artifacts");
        assert_eq!(main.username.as_deref(), Some("deployer"));
        assert_eq!(main.password.as_deref(), Some("secret"));

        let public = config.repositories.get("public").unwrap();
        assert_eq!(public.username, None);
    }

    #[test]
    fn test_repository_section_requires_url() {
        let mut ini = Ini::new();
        ini.read("[repository.broken]\nusername = someone\n".to_string())
            .unwrap();

        let mut config = default_config();
        assert!(matches!(
            apply_ini_to_config(&mut config, &ini),
            Err(ConfigError::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn test_read_config_layers_files_and_overrides() {
        let mut base = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            base,
            "[network]\ntimeout_secs = 10\n\n[repository.main]\nurl = http://base.example.com/"
        )
        .unwrap();
        let mut layer = tempfile::NamedTempFile::new().unwrap();
        writeln!(layer, "[repository.main]\nurl = http://layer.example.com/").unwrap();

        let source = ConfigSource {
            config_file: Some(base.path().to_path_buf()),
            override_file: Some(layer.path().to_path_buf()),
            overrides: vec![("network.timeout_secs".to_string(), "5".to_string())],
        };
        let result = read_config(&source).unwrap();

        assert_eq!(result.config.network.timeout_secs, 5);
        assert_eq!(
            result.config.repositories.get("main").unwrap().url,
            "http://layer.example.com/"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_explicit_file() {
        let source = ConfigSource {
            config_file: Some(PathBuf::from("/nonexistent/davstoreconfig")),
            ..Default::default()
        };
        assert!(matches!(
            read_config(&source),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
