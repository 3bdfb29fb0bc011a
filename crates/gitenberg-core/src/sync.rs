//! Pull and push decisions for linked posts.
//!
//! Pull runs when the host serializes a post for the editor and overlays the
//! remote file onto the body. Push runs on a status transition and writes the
//! body back, guarded by the stored revision marker. Neither path ever returns
//! an error to the host: pulls degrade to the local content and push failures
//! are logged and reported as an outcome.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::config::{Config, ConfigResolver};
use crate::editor::{file_picker_options, EditorData};
use crate::error::{ClientError, SyncError, MISSING_CREDENTIALS_MESSAGE};
use crate::host::{PostId, PostStore};
use crate::registry::LinkedFileRegistry;
use crate::remote::{ContentRemote, RemoteFileDescriptor, DEFAULT_BRANCH};
use crate::status::{evaluate_gates, StatusTransition, SuppressReason};

/// Decides whether a linked post loads its content from the remote.
pub trait LoadPolicy: Send + Sync {
    fn should_load(&self, post_id: PostId, linked_path: &str, current_content: &str) -> bool;
}

/// Always load once a file is linked.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysLoad;

impl LoadPolicy for AlwaysLoad {
    fn should_load(&self, _post_id: PostId, _linked_path: &str, _current_content: &str) -> bool {
        true
    }
}

/// Why a pull kept the local content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalReason {
    NotConfigured,
    NotLinked,
    PolicyDeclined,
    FetchFailed(SyncError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullSource {
    Remote,
    Local(LocalReason),
}

/// Body the host should serve after a pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullOutcome {
    pub content: String,
    /// Marker of the fetched version, `None` when the local content was kept
    pub revision_marker: Option<String>,
    pub source: PullSource,
}

impl PullOutcome {
    fn local(content: String, reason: LocalReason) -> Self {
        Self {
            content,
            revision_marker: None,
            source: PullSource::Local(reason),
        }
    }
}

/// Terminal state of the push path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    Suppressed(SuppressReason),
    NotConfigured,
    NotLinked,
    Pushed {
        path: String,
        revision_marker: String,
        /// Unix timestamp of the successful push
        pushed_at: i64,
    },
    Failed(SyncError),
}

/// The synchronization state machine.
pub struct SyncEngine {
    resolver: Arc<ConfigResolver>,
    registry: LinkedFileRegistry,
    posts: Arc<dyn PostStore>,
    remote: Arc<dyn ContentRemote>,
    policy: Arc<dyn LoadPolicy>,
}

impl SyncEngine {
    pub fn new(
        resolver: Arc<ConfigResolver>,
        posts: Arc<dyn PostStore>,
        remote: Arc<dyn ContentRemote>,
    ) -> Self {
        Self {
            resolver,
            registry: LinkedFileRegistry::new(posts.clone()),
            posts,
            remote,
            policy: Arc::new(AlwaysLoad),
        }
    }

    pub fn with_load_policy(mut self, policy: Arc<dyn LoadPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &LinkedFileRegistry {
        &self.registry
    }

    /// Misconfiguration message for administrators, `None` when configured.
    pub async fn admin_notice(&self) -> Option<&'static str> {
        match self.resolver.resolve().await {
            Ok(_) => None,
            Err(e) => {
                debug!("Config unresolved: {}", e);
                Some(MISSING_CREDENTIALS_MESSAGE)
            }
        }
    }

    /// List the markdown files of the configured remote directory.
    #[instrument(skip(self), level = "debug")]
    pub async fn list_files(&self) -> Result<Vec<RemoteFileDescriptor>, SyncError> {
        let config = self.resolver.resolve().await?;
        Ok(self.remote.list_files(&config).await?)
    }

    /// Picker data for the editor. Listing failures degrade to an empty list.
    #[instrument(skip(self), level = "debug")]
    pub async fn editor_data(&self) -> Option<EditorData> {
        let config = self.resolver.resolve().await.ok()?;
        let markdown_files = match self.remote.list_files(&config).await {
            Ok(files) => files,
            Err(e) => {
                warn!("Listing {} failed, offering no files: {}", config.remote_dir, e);
                Vec::new()
            }
        };
        let options = file_picker_options(&markdown_files);
        Some(EditorData {
            repo: config.repo,
            markdown_files,
            options,
        })
    }

    /// Overlay the linked remote file onto `current_content`.
    #[instrument(skip(self, current_content), level = "debug")]
    pub async fn pull(&self, post_id: PostId, current_content: String) -> PullOutcome {
        let config = match self.resolver.resolve().await {
            Ok(config) => config,
            Err(_) => return PullOutcome::local(current_content, LocalReason::NotConfigured),
        };

        let linked_path = match self.registry.linked_path(post_id).await {
            Ok(Some(path)) => path,
            Ok(None) => return PullOutcome::local(current_content, LocalReason::NotLinked),
            Err(e) => {
                warn!("Reading linked file of post {} failed: {}", post_id, e);
                return PullOutcome::local(current_content, LocalReason::FetchFailed(e.into()));
            }
        };

        if !self.policy.should_load(post_id, &linked_path, &current_content) {
            debug!("Load policy declined remote content for post {}", post_id);
            return PullOutcome::local(current_content, LocalReason::PolicyDeclined);
        }

        let file = match self
            .remote
            .fetch_file(&config, &linked_path, DEFAULT_BRANCH)
            .await
        {
            Ok(file) => file,
            Err(e) => {
                warn!("Fetching {} for post {} failed: {}", linked_path, post_id, e);
                return PullOutcome::local(current_content, LocalReason::FetchFailed(e.into()));
            }
        };

        if let Err(e) = self
            .registry
            .set_revision_marker(post_id, &file.revision_marker)
            .await
        {
            warn!("Recording revision marker for post {} failed: {}", post_id, e);
        }

        debug!(
            "Loaded {} ({} bytes) into post {}",
            file.path,
            file.content.len(),
            post_id
        );
        PullOutcome {
            content: file.content,
            revision_marker: Some(file.revision_marker),
            source: PullSource::Remote,
        }
    }

    /// Run the push path for a status transition.
    #[instrument(skip(self), level = "debug", fields(post_id = transition.post_id))]
    pub async fn on_transition(&self, transition: &StatusTransition) -> PushOutcome {
        if let Err(reason) = evaluate_gates(transition) {
            debug!(
                "Push suppressed for post {} ({} -> {}): {}",
                transition.post_id, transition.old_status, transition.new_status, reason
            );
            return PushOutcome::Suppressed(reason);
        }

        let config = match self.resolver.resolve().await {
            Ok(config) => config,
            Err(_) => return PushOutcome::NotConfigured,
        };

        match self.push(&config, transition.post_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Push for post {} failed: {}", transition.post_id, e);
                PushOutcome::Failed(e)
            }
        }
    }

    async fn push(&self, config: &Config, post_id: PostId) -> Result<PushOutcome, SyncError> {
        let binding = self.registry.binding(post_id).await?;
        let path = match binding.linked_path {
            Some(path) => path,
            None => return Ok(PushOutcome::NotLinked),
        };

        let content = self.posts.content(post_id).await?.unwrap_or_default();

        let revision_marker = self
            .remote
            .push_file(
                config,
                &path,
                &content,
                binding.revision_marker.as_deref(),
                DEFAULT_BRANCH,
            )
            .await
            .map_err(|e| match e {
                e @ ClientError::WriteFailed { .. } => e,
                other => ClientError::WriteFailed {
                    path: path.clone(),
                    status: None,
                    reason: other.to_string(),
                },
            })?;

        if let Err(e) = self.registry.set_revision_marker(post_id, &revision_marker).await {
            warn!("Recording revision marker for post {} failed: {}", post_id, e);
        }

        info!("Pushed post {} to {}", post_id, path);
        Ok(PushOutcome::Pushed {
            path,
            revision_marker,
            pushed_at: chrono::Utc::now().timestamp(),
        })
    }
}
