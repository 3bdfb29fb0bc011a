//! Post status transitions and the push-path gates.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::host::PostId;

/// Post status as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    AutoDraft,
    Inherit,
    New,
    Other(String),
}

impl PostStatus {
    pub fn as_str(&self) -> &str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
            PostStatus::Trash => "trash",
            PostStatus::AutoDraft => "auto-draft",
            PostStatus::Inherit => "inherit",
            PostStatus::New => "new",
            PostStatus::Other(s) => s,
        }
    }

    /// Statuses of posts that have never been real content.
    pub fn is_initial(&self) -> bool {
        matches!(self, PostStatus::AutoDraft | PostStatus::Inherit | PostStatus::New)
    }
}

impl FromStr for PostStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "publish" => PostStatus::Publish,
            "draft" => PostStatus::Draft,
            "pending" => PostStatus::Pending,
            "private" => PostStatus::Private,
            "future" => PostStatus::Future,
            "trash" => PostStatus::Trash,
            "auto-draft" => PostStatus::AutoDraft,
            "inherit" => PostStatus::Inherit,
            "new" => PostStatus::New,
            other => PostStatus::Other(other.to_string()),
        })
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PostStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PostStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_else(|never: Infallible| match never {}))
    }
}

/// A post status change observed by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Filled in from the route when the transition arrives over HTTP
    #[serde(default)]
    pub post_id: PostId,
    pub old_status: PostStatus,
    pub new_status: PostStatus,
    /// The save was triggered by the editor's autosave
    #[serde(default)]
    pub is_autosave: bool,
    /// The acting user may edit this post
    #[serde(default = "default_true")]
    pub user_can_edit: bool,
    /// The saved object is a revision-history snapshot
    #[serde(default)]
    pub is_revision: bool,
}

fn default_true() -> bool {
    true
}

/// The gate that suppressed a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressReason {
    Autosave,
    NotPermitted,
    Revision,
    InitialStatus,
    DraftToDraft,
    NotPublishRelated,
}

impl fmt::Display for SuppressReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SuppressReason::Autosave => "autosave",
            SuppressReason::NotPermitted => "user cannot edit post",
            SuppressReason::Revision => "revision snapshot",
            SuppressReason::InitialStatus => "initial status",
            SuppressReason::DraftToDraft => "draft to draft",
            SuppressReason::NotPublishRelated => "neither side is published",
        };
        f.write_str(s)
    }
}

/// Apply the push gates in order. `Ok(())` means the push may proceed.
pub fn evaluate_gates(transition: &StatusTransition) -> Result<(), SuppressReason> {
    if transition.is_autosave {
        return Err(SuppressReason::Autosave);
    }
    if !transition.user_can_edit {
        return Err(SuppressReason::NotPermitted);
    }
    if transition.is_revision {
        return Err(SuppressReason::Revision);
    }
    if transition.new_status.is_initial() {
        return Err(SuppressReason::InitialStatus);
    }
    if transition.old_status == PostStatus::Draft && transition.new_status == PostStatus::Draft {
        return Err(SuppressReason::DraftToDraft);
    }
    if transition.old_status != PostStatus::Publish && transition.new_status != PostStatus::Publish {
        return Err(SuppressReason::NotPublishRelated);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(old: &str, new: &str) -> StatusTransition {
        StatusTransition {
            post_id: 1,
            old_status: old.parse().unwrap(),
            new_status: new.parse().unwrap(),
            is_autosave: false,
            user_can_edit: true,
            is_revision: false,
        }
    }

    #[test]
    fn test_status_parse_roundtrip() {
        for s in ["publish", "draft", "auto-draft", "inherit", "new", "pending", "custom"] {
            let status: PostStatus = s.parse().unwrap();
            assert_eq!(status.as_str(), s);
        }
        assert_eq!("custom".parse::<PostStatus>().unwrap(), PostStatus::Other("custom".into()));
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(evaluate_gates(&transition("draft", "draft")), Err(SuppressReason::DraftToDraft));
        assert_eq!(evaluate_gates(&transition("auto-draft", "draft")), Err(SuppressReason::NotPublishRelated));
        assert_eq!(evaluate_gates(&transition("draft", "auto-draft")), Err(SuppressReason::InitialStatus));
        assert_eq!(evaluate_gates(&transition("publish", "inherit")), Err(SuppressReason::InitialStatus));
        assert_eq!(evaluate_gates(&transition("draft", "pending")), Err(SuppressReason::NotPublishRelated));

        assert_eq!(evaluate_gates(&transition("draft", "publish")), Ok(()));
        assert_eq!(evaluate_gates(&transition("publish", "draft")), Ok(()));
        assert_eq!(evaluate_gates(&transition("publish", "publish")), Ok(()));
        assert_eq!(evaluate_gates(&transition("publish", "trash")), Ok(()));
        assert_eq!(evaluate_gates(&transition("auto-draft", "publish")), Ok(()));
    }

    #[test]
    fn test_context_gates_run_first() {
        let mut t = transition("draft", "publish");
        t.is_autosave = true;
        t.user_can_edit = false;
        assert_eq!(evaluate_gates(&t), Err(SuppressReason::Autosave));

        t.is_autosave = false;
        assert_eq!(evaluate_gates(&t), Err(SuppressReason::NotPermitted));

        t.user_can_edit = true;
        t.is_revision = true;
        assert_eq!(evaluate_gates(&t), Err(SuppressReason::Revision));
    }

    #[test]
    fn test_transition_deserialize_defaults() {
        let t: StatusTransition = serde_json::from_str(
            r#"{"post_id": 5, "old_status": "auto-draft", "new_status": "publish"}"#,
        )
        .unwrap();
        assert_eq!(t.old_status, PostStatus::AutoDraft);
        assert_eq!(t.new_status, PostStatus::Publish);
        assert!(t.user_can_edit);
        assert!(!t.is_autosave);
        assert!(!t.is_revision);
    }

    #[test]
    fn test_transition_deserialize_without_post_id() {
        let t: StatusTransition = serde_json::from_str(
            r#"{"old_status": "draft", "new_status": "publish", "user_can_edit": false}"#,
        )
        .unwrap();
        assert_eq!(t.post_id, 0);
        assert_eq!(t.old_status, PostStatus::Draft);
        assert!(!t.user_can_edit);
    }
}
