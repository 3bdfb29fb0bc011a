//! Layered configuration resolution.
//!
//! Precedence per field: deployment override, then stored setting, then (for
//! the remote directory only) a hard default. Empty strings count as absent at
//! every layer.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ConfigError, SettingsError};
use crate::host::SettingsStore;

pub const REPO_SETTING: &str = "gitenberg_github_repo";
pub const TOKEN_SETTING: &str = "gitenberg_github_personal_access_token";
pub const REMOTE_DIR_SETTING: &str = "gitenberg_github_remote_dir";

/// Remote directory used when neither layer provides one.
pub const DEFAULT_REMOTE_DIR: &str = "docs";

/// Confirmation returned after settings are saved.
pub const SETTINGS_SAVED_MESSAGE: &str = "Settings updated successfully";

/// Resolved configuration, threaded explicitly into every remote operation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Repository identifier, `owner/name`
    pub repo: String,
    /// Access credential
    pub token: String,
    /// Directory listed for markdown files
    pub remote_dir: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("remote_dir", &self.remote_dir)
            .finish()
    }
}

/// Deployment-level values that win over stored settings.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub repo: Option<String>,
    pub token: Option<String>,
    pub remote_dir: Option<String>,
}

/// Settings submitted by an administrator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub remote_dir: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_dir(dir: &str) -> String {
    dir.trim_matches('/').to_string()
}

/// Resolves [`Config`] from overrides and the host settings store.
pub struct ConfigResolver {
    overrides: ConfigOverrides,
    settings: Arc<dyn SettingsStore>,
}

impl ConfigResolver {
    pub fn new(overrides: ConfigOverrides, settings: Arc<dyn SettingsStore>) -> Self {
        Self {
            overrides,
            settings,
        }
    }

    async fn layered(&self, override_value: &Option<String>, key: &str) -> Result<Option<String>, ConfigError> {
        if let Some(value) = non_empty(override_value.clone()) {
            return Ok(Some(value));
        }
        Ok(non_empty(self.settings.get(key).await?))
    }

    /// Resolve the configuration for one request.
    #[instrument(skip(self), level = "debug")]
    pub async fn resolve(&self) -> Result<Config, ConfigError> {
        let repo = self.layered(&self.overrides.repo, REPO_SETTING).await?;
        let token = self.layered(&self.overrides.token, TOKEN_SETTING).await?;

        let (repo, token) = match (repo, token) {
            (Some(repo), Some(token)) => (repo, token),
            _ => {
                debug!("Repository or token missing, gitenberg disabled for this request");
                return Err(ConfigError::MissingCredentials);
            }
        };

        let remote_dir = self
            .layered(&self.overrides.remote_dir, REMOTE_DIR_SETTING)
            .await?
            .map(|dir| normalize_dir(&dir))
            .unwrap_or_else(|| DEFAULT_REMOTE_DIR.to_string());

        Ok(Config {
            repo,
            token,
            remote_dir,
        })
    }

    /// Validate and persist administrator settings.
    ///
    /// Stored settings are still shadowed by any deployment override.
    #[instrument(skip(self, update), level = "debug", fields(repo = %update.repo))]
    pub async fn save_settings(&self, update: SettingsUpdate) -> Result<&'static str, SettingsError> {
        let repo = update.repo.trim();
        let token = update.token.trim();
        let remote_dir = update.remote_dir.trim();

        if repo.is_empty() || token.is_empty() {
            return Err(SettingsError::MissingRepoOrToken);
        }

        self.settings.set(REPO_SETTING, repo).await?;
        self.settings.set(TOKEN_SETTING, token).await?;
        self.settings.set(REMOTE_DIR_SETTING, remote_dir).await?;

        debug!("Saved gitenberg settings for {}", repo);
        Ok(SETTINGS_SAVED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySettingsStore;

    async fn store_with(values: &[(&str, &str)]) -> Arc<MemorySettingsStore> {
        let store = Arc::new(MemorySettingsStore::new());
        for (k, v) in values {
            store.set(k, v).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_missing_repo_or_token() {
        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![],
            vec![(REPO_SETTING, "owner/repo")],
            vec![(TOKEN_SETTING, "ghp_x")],
            vec![(REPO_SETTING, ""), (TOKEN_SETTING, "ghp_x")],
            vec![(REPO_SETTING, "owner/repo"), (TOKEN_SETTING, "   ")],
        ];

        for values in cases {
            let resolver = ConfigResolver::new(ConfigOverrides::default(), store_with(&values).await);
            assert_eq!(
                resolver.resolve().await,
                Err(ConfigError::MissingCredentials),
                "values: {:?}",
                values
            );
        }
    }

    #[tokio::test]
    async fn test_stored_settings_and_default_dir() {
        let store = store_with(&[(REPO_SETTING, "owner/repo"), (TOKEN_SETTING, "ghp_x")]).await;
        let resolver = ConfigResolver::new(ConfigOverrides::default(), store);

        let config = resolver.resolve().await.unwrap();
        assert_eq!(config.repo, "owner/repo");
        assert_eq!(config.token, "ghp_x");
        assert_eq!(config.remote_dir, DEFAULT_REMOTE_DIR);
    }

    #[tokio::test]
    async fn test_overrides_win() {
        let store = store_with(&[
            (REPO_SETTING, "stored/repo"),
            (TOKEN_SETTING, "stored-token"),
            (REMOTE_DIR_SETTING, "stored-dir"),
        ])
        .await;
        let overrides = ConfigOverrides {
            repo: Some("env/repo".to_string()),
            token: None,
            remote_dir: Some("/guides/".to_string()),
        };
        let resolver = ConfigResolver::new(overrides, store);

        let config = resolver.resolve().await.unwrap();
        assert_eq!(config.repo, "env/repo");
        assert_eq!(config.token, "stored-token");
        assert_eq!(config.remote_dir, "guides");
    }

    #[tokio::test]
    async fn test_empty_override_falls_through() {
        let store = store_with(&[(REPO_SETTING, "stored/repo"), (TOKEN_SETTING, "t")]).await;
        let overrides = ConfigOverrides {
            repo: Some(String::new()),
            ..Default::default()
        };
        let resolver = ConfigResolver::new(overrides, store);
        assert_eq!(resolver.resolve().await.unwrap().repo, "stored/repo");
    }

    #[tokio::test]
    async fn test_save_settings() {
        let store = Arc::new(MemorySettingsStore::new());
        let resolver = ConfigResolver::new(ConfigOverrides::default(), store.clone());

        let result = resolver
            .save_settings(SettingsUpdate {
                repo: " owner/repo ".to_string(),
                token: String::new(),
                remote_dir: "docs".to_string(),
            })
            .await;
        assert_eq!(result, Err(SettingsError::MissingRepoOrToken));
        assert_eq!(store.get(REPO_SETTING).await.unwrap(), None);

        let message = resolver
            .save_settings(SettingsUpdate {
                repo: " owner/repo ".to_string(),
                token: "ghp_x".to_string(),
                remote_dir: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(message, SETTINGS_SAVED_MESSAGE);

        let config = resolver.resolve().await.unwrap();
        assert_eq!(config.repo, "owner/repo");
        assert_eq!(config.remote_dir, DEFAULT_REMOTE_DIR);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = Config {
            repo: "owner/repo".to_string(),
            token: "ghp_secret".to_string(),
            remote_dir: "docs".to_string(),
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("owner/repo"));
    }
}
