//! Per-post link between a post and its remote markdown file.
//!
//! Empty strings and unset values are the same thing: no link.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::StoreError;
use crate::host::{PostId, PostStore};

pub const LINKED_FILE_META: &str = "gitenberg_linked_markdown_file";
pub const REVISION_MARKER_META: &str = "gitenberg_linked_markdown_file_sha";

/// A post's linked path and last-synced revision marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkedFileBinding {
    pub linked_path: Option<String>,
    pub revision_marker: Option<String>,
}

/// Accessors over the host's per-post metadata.
pub struct LinkedFileRegistry {
    posts: Arc<dyn PostStore>,
}

impl LinkedFileRegistry {
    pub fn new(posts: Arc<dyn PostStore>) -> Self {
        Self { posts }
    }

    async fn read(&self, post_id: PostId, key: &str) -> Result<Option<String>, StoreError> {
        if !self.posts.exists(post_id).await? {
            return Ok(None);
        }
        Ok(self
            .posts
            .get_meta(post_id, key)
            .await?
            .filter(|v| !v.is_empty()))
    }

    pub async fn linked_path(&self, post_id: PostId) -> Result<Option<String>, StoreError> {
        self.read(post_id, LINKED_FILE_META).await
    }

    pub async fn revision_marker(&self, post_id: PostId) -> Result<Option<String>, StoreError> {
        self.read(post_id, REVISION_MARKER_META).await
    }

    /// Both halves of the binding. The marker is dropped when no path is linked.
    pub async fn binding(&self, post_id: PostId) -> Result<LinkedFileBinding, StoreError> {
        let linked_path = self.linked_path(post_id).await?;
        let revision_marker = match linked_path {
            Some(_) => self.revision_marker(post_id).await?,
            None => None,
        };
        Ok(LinkedFileBinding {
            linked_path,
            revision_marker,
        })
    }

    /// Link a post to a remote path. An empty path unlinks.
    ///
    /// Unlinking or switching to another path clears the stored marker, since
    /// it belonged to the previous file.
    #[instrument(skip(self), level = "debug")]
    pub async fn set_linked_path(&self, post_id: PostId, path: &str) -> Result<(), StoreError> {
        let path = path.trim();
        if path.is_empty() {
            self.posts.delete_meta(post_id, LINKED_FILE_META).await?;
            self.posts.delete_meta(post_id, REVISION_MARKER_META).await?;
            debug!("Unlinked post {}", post_id);
            return Ok(());
        }

        if self.linked_path(post_id).await?.as_deref() != Some(path) {
            self.posts.delete_meta(post_id, REVISION_MARKER_META).await?;
        }
        self.posts.set_meta(post_id, LINKED_FILE_META, path).await?;
        debug!("Linked post {} to {}", post_id, path);
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn set_revision_marker(&self, post_id: PostId, marker: &str) -> Result<(), StoreError> {
        self.posts
            .set_meta(post_id, REVISION_MARKER_META, marker)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryPostStore;

    fn setup() -> (LinkedFileRegistry, Arc<MemoryPostStore>) {
        let posts = Arc::new(MemoryPostStore::new());
        posts.upsert_post(1, "body");
        (LinkedFileRegistry::new(posts.clone()), posts)
    }

    #[tokio::test]
    async fn test_missing_post_is_absent() {
        let (registry, _) = setup();
        assert_eq!(registry.linked_path(99).await.unwrap(), None);
        assert_eq!(registry.revision_marker(99).await.unwrap(), None);
        assert_eq!(registry.binding(99).await.unwrap(), LinkedFileBinding::default());
    }

    #[tokio::test]
    async fn test_empty_meta_is_absent() {
        let (registry, posts) = setup();
        posts.set_meta(1, LINKED_FILE_META, "").await.unwrap();
        posts.set_meta(1, REVISION_MARKER_META, "").await.unwrap();

        assert_eq!(registry.linked_path(1).await.unwrap(), None);
        assert_eq!(registry.revision_marker(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_link_and_marker() {
        let (registry, _) = setup();
        registry.set_linked_path(1, "docs/a.md").await.unwrap();
        registry.set_revision_marker(1, "abc123").await.unwrap();

        let binding = registry.binding(1).await.unwrap();
        assert_eq!(binding.linked_path.as_deref(), Some("docs/a.md"));
        assert_eq!(binding.revision_marker.as_deref(), Some("abc123"));

        // Re-selecting the same file keeps the marker
        registry.set_linked_path(1, "docs/a.md").await.unwrap();
        assert_eq!(registry.revision_marker(1).await.unwrap().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_unlink_clears_marker() {
        let (registry, _) = setup();
        registry.set_linked_path(1, "docs/a.md").await.unwrap();
        registry.set_revision_marker(1, "abc123").await.unwrap();

        registry.set_linked_path(1, "").await.unwrap();
        assert_eq!(registry.binding(1).await.unwrap(), LinkedFileBinding::default());
        assert_eq!(registry.revision_marker(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_switching_file_clears_marker() {
        let (registry, _) = setup();
        registry.set_linked_path(1, "docs/a.md").await.unwrap();
        registry.set_revision_marker(1, "abc123").await.unwrap();

        registry.set_linked_path(1, "docs/b.md").await.unwrap();
        let binding = registry.binding(1).await.unwrap();
        assert_eq!(binding.linked_path.as_deref(), Some("docs/b.md"));
        assert_eq!(binding.revision_marker, None);
    }

    #[tokio::test]
    async fn test_marker_without_path_is_hidden() {
        let (registry, posts) = setup();
        posts.set_meta(1, REVISION_MARKER_META, "orphan").await.unwrap();
        assert_eq!(registry.binding(1).await.unwrap().revision_marker, None);
    }
}
