//! Host collaborator interfaces.
//!
//! The content host owns settings, post bodies and per-post metadata.
//! The core only talks to it through these traits so the same decisions run
//! against a real CMS adapter or the in-memory stores below.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::StoreError;

/// Identifier of a post in the host.
pub type PostId = u64;

/// Host configuration store (the "stored setting" layer of config resolution).
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read a setting. `None` when it was never saved.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Upsert a setting.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Host post storage: bodies and per-post key/value metadata.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Whether the post exists.
    async fn exists(&self, post_id: PostId) -> Result<bool, StoreError>;

    /// Current body text of the post, `None` if the post does not exist.
    async fn content(&self, post_id: PostId) -> Result<Option<String>, StoreError>;

    /// Read a single metadata value.
    async fn get_meta(&self, post_id: PostId, key: &str) -> Result<Option<String>, StoreError>;

    /// Upsert a metadata value. Fails with `PostNotFound` if the post does not exist.
    async fn set_meta(&self, post_id: PostId, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a metadata value. Removing a missing key is not an error.
    async fn delete_meta(&self, post_id: PostId, key: &str) -> Result<(), StoreError>;
}

/// In-memory settings store.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: DashMap<String, String>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct StoredPost {
    content: String,
    meta: std::collections::HashMap<String, String>,
}

/// In-memory post store.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: DashMap<PostId, StoredPost>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a post's body, keeping its metadata.
    pub fn upsert_post(&self, post_id: PostId, content: impl Into<String>) {
        self.posts.entry(post_id).or_default().content = content.into();
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn exists(&self, post_id: PostId) -> Result<bool, StoreError> {
        Ok(self.posts.contains_key(&post_id))
    }

    async fn content(&self, post_id: PostId) -> Result<Option<String>, StoreError> {
        Ok(self.posts.get(&post_id).map(|p| p.content.clone()))
    }

    async fn get_meta(&self, post_id: PostId, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .posts
            .get(&post_id)
            .and_then(|p| p.meta.get(key).cloned()))
    }

    async fn set_meta(&self, post_id: PostId, key: &str, value: &str) -> Result<(), StoreError> {
        let mut post = self
            .posts
            .get_mut(&post_id)
            .ok_or(StoreError::PostNotFound(post_id))?;
        post.meta.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_meta(&self, post_id: PostId, key: &str) -> Result<(), StoreError> {
        if let Some(mut post) = self.posts.get_mut(&post_id) {
            post.meta.remove(key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settings_roundtrip() {
        let store = MemorySettingsStore::new();
        assert_eq!(store.get("gitenberg_github_repo").await.unwrap(), None);

        store.set("gitenberg_github_repo", "owner/repo").await.unwrap();
        assert_eq!(
            store.get("gitenberg_github_repo").await.unwrap().as_deref(),
            Some("owner/repo")
        );
    }

    #[tokio::test]
    async fn test_meta_requires_post() {
        let store = MemoryPostStore::new();
        let result = store.set_meta(7, "k", "v").await;
        assert_eq!(result, Err(StoreError::PostNotFound(7)));

        store.upsert_post(7, "body");
        store.set_meta(7, "k", "v").await.unwrap();
        assert_eq!(store.get_meta(7, "k").await.unwrap().as_deref(), Some("v"));

        // Replacing the body keeps metadata
        store.upsert_post(7, "new body");
        assert_eq!(store.content(7).await.unwrap().as_deref(), Some("new body"));
        assert_eq!(store.get_meta(7, "k").await.unwrap().as_deref(), Some("v"));

        store.delete_meta(7, "k").await.unwrap();
        assert_eq!(store.get_meta(7, "k").await.unwrap(), None);
    }
}
