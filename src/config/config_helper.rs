//! Resolving a repository out of the parsed configuration.

use std::time::Duration;

use super::read_config::{ConfigError, Result};
use super::{Config, RepositoryConfig};
use crate::location::RootLocation;

impl Config {
    /// Resolve `spec` into a repository configuration.
    ///
    /// `spec` is either the name of a `[repository.<name>]` section or, if it
    /// contains `://`, a root URL used without credentials.
    pub fn repository(&self, spec: &str) -> Result<RepositoryConfig> {
        let (url, username, password) = if spec.contains("://") {
            (spec.to_string(), None, None)
        } else {
            let entry = self
                .repositories
                .get(spec)
                .ok_or_else(|| ConfigError::UnknownRepository(spec.to_string()))?;
            if entry.url.is_empty() {
                return Err(ConfigError::MissingRequiredField {
                    section: format!("repository.{}", spec),
                    field: "url".to_string(),
                });
            }
            (
                entry.url.clone(),
                entry.username.clone(),
                entry.password.clone(),
            )
        };

        Ok(RepositoryConfig {
            root: RootLocation::new(url),
            username,
            password,
            timeout: Duration::from_secs(self.network.timeout_secs),
            hidden_prefix: self.listing.hidden_prefix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::config::{ListingConfig, NetworkConfig, RepositoryEntry};

    fn config_with(repositories: &[(&str, RepositoryEntry)]) -> Config {
        Config {
            network: NetworkConfig { timeout_secs: 5 },
            listing: ListingConfig {
                hidden_prefix: ".".to_string(),
            },
            repositories: repositories
                .iter()
                .map(|(name, entry)| (name.to_string(), entry.clone()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_named_repository() {
        let config = config_with(&[(
            "main",
            RepositoryEntry {
                url: "http://dav.example.com/artifacts".to_string(),
                username: Some("deployer".to_string()),
                password: Some("secret".to_string()),
            },
        )]);

        let repo = config.repository("main").unwrap();
        assert_eq!(repo.root.as_str(), "webdav://dav.example.com/artifacts/");
        assert_eq!(repo.username.as_deref(), Some("deployer"));
        assert_eq!(repo.password.as_deref(), Some("secret"));
        assert_eq!(repo.timeout, Duration::from_secs(5));
        assert_eq!(repo.hidden_prefix, ".");
        assert!(!format!("{:?}", repo).contains("secret"));
    }

    #[test]
    fn test_url_repository() {
        let mut config = config_with(&[]);
        config.listing.hidden_prefix = "_".to_string();
        let repo = config.repository("webdav://dav.example.com").unwrap();
        assert_eq!(repo.root.as_str(), "webdav://dav.example.com/");
        assert_eq!(repo.username, None);
        assert_eq!(repo.hidden_prefix, "_");
    }

    #[test]
    fn test_unknown_repository() {
        let config = config_with(&[]);
        assert!(matches!(
            config.repository("nope"),
            Err(ConfigError::UnknownRepository(_))
        ));
    }

    #[test]
    fn test_repository_without_url() {
        let config = config_with(&[(
            "partial",
            RepositoryEntry {
                username: Some("someone".to_string()),
                ..Default::default()
            },
        )]);
        assert!(matches!(
            config.repository("partial"),
            Err(ConfigError::MissingRequiredField { .. })
        ));
    }
}
