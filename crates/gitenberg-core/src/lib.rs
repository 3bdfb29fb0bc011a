//! Core types and sync decisions for gitenberg.
//!
//! This crate keeps a content host's posts in step with markdown files in a
//! remote repository, without any network code of its own:
//! - `ConfigResolver`: layered repository/token/directory configuration
//! - `ContentRemote`: list, fetch and push operations (implemented by `gitenberg-github`)
//! - `LinkedFileRegistry`: per-post linked path and revision marker
//! - `SyncEngine`: pull on read, gated push on status transitions

mod config;
mod editor;
mod error;
mod host;
mod registry;
mod remote;
mod status;
mod sync;

pub use config::{
    Config, ConfigOverrides, ConfigResolver, SettingsUpdate, DEFAULT_REMOTE_DIR,
    REMOTE_DIR_SETTING, REPO_SETTING, SETTINGS_SAVED_MESSAGE, TOKEN_SETTING,
};
pub use editor::{file_picker_options, EditorData, SelectOption, UNLINKED_LABEL};
pub use error::{
    ClientError, ConfigError, SettingsError, StoreError, SyncError, MISSING_CREDENTIALS_MESSAGE,
};
pub use host::{MemoryPostStore, MemorySettingsStore, PostId, PostStore, SettingsStore};
pub use registry::{LinkedFileBinding, LinkedFileRegistry, LINKED_FILE_META, REVISION_MARKER_META};
pub use remote::{
    is_markdown, ContentRemote, RemoteFileContent, RemoteFileDescriptor, COMMIT_MESSAGE,
    DEFAULT_BRANCH,
};
pub use status::{evaluate_gates, PostStatus, StatusTransition, SuppressReason};
pub use sync::{AlwaysLoad, LoadPolicy, LocalReason, PullOutcome, PullSource, PushOutcome, SyncEngine};
