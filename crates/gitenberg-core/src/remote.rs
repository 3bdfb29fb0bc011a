use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::ClientError;

/// Branch every read and write targets.
pub const DEFAULT_BRANCH: &str = "main";

/// Commit message attached to every push.
pub const COMMIT_MESSAGE: &str = "Update from WordPress";

/// A directory-listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileDescriptor {
    pub name: String,
    pub path: String,
}

/// A fetched remote file with its content already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileContent {
    pub name: String,
    pub path: String,
    pub content: String,
    /// Content hash assigned by the remote store; required to overwrite this version.
    pub revision_marker: String,
}

/// Whether a file name carries the markdown extension.
///
/// Only the last path segment counts. A bare `.md` is markdown too, matching
/// how the content host classifies file names.
pub fn is_markdown(name: &str) -> bool {
    name.rsplit('/')
        .next()
        .and_then(|base| base.rsplit_once('.'))
        .is_some_and(|(_, ext)| ext == "md")
}

/// Remote content store operations.
#[async_trait]
pub trait ContentRemote: Send + Sync {
    /// List the entries of `config.remote_dir`.
    async fn list_files(&self, config: &Config) -> Result<Vec<RemoteFileDescriptor>, ClientError>;

    /// Fetch and decode a single markdown file.
    async fn fetch_file(
        &self,
        config: &Config,
        path: &str,
        branch: &str,
    ) -> Result<RemoteFileContent, ClientError>;

    /// Create or update a file, guarded by the previous revision marker.
    ///
    /// # Returns
    /// The new revision marker assigned by the remote store.
    async fn push_file(
        &self,
        config: &Config,
        path: &str,
        content: &str,
        previous_marker: Option<&str>,
        branch: &str,
    ) -> Result<String, ClientError>;
}
