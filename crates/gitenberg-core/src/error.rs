use thiserror::Error;

/// Message shown to administrators while the repository or token is missing.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "The GITENBERG_GITHUB_REPO and GITENBERG_GITHUB_PERSONAL_ACCESS_TOKEN are required for the Gitenberg plugin to function properly. Please define them in the deployment environment or set them in the plugin settings.";

/// Configuration could not be resolved.
///
/// Callers treat this as "feature disabled for this request", never as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{}", MISSING_CREDENTIALS_MESSAGE)]
    MissingCredentials,

    #[error("Settings store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the remote content store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("Remote path not found: {0}")]
    NotFound(String),

    #[error("Invalid response from remote: {0}")]
    InvalidResponse(String),

    #[error("Not a markdown file: {0}")]
    NotMarkdown(String),

    #[error("No content found for markdown file: {0}")]
    EmptyContent(String),

    #[error("Write to {path} failed{}: {reason}", .status.map(|s| format!(" with status {}", s)).unwrap_or_default())]
    WriteFailed {
        path: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ClientError {
    /// True when the remote rejected a write because the revision marker was stale.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::WriteFailed { status: Some(409), .. })
    }
}

/// Errors from host-provided key/value storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    PostNotFound(u64),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors from saving plugin settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("Repository and token are required.")]
    MissingRepoOrToken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Any failure inside a sync operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
