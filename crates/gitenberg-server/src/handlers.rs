//! HTTP handlers for the gitenberg adapter.
//!
//! Implements:
//! - GET /health - Health check endpoint
//! - GET /gitenberg/v1/list-markdown-files - Remote directory listing
//! - GET|POST /gitenberg/v1/settings - Repository settings
//! - GET /gitenberg/v1/editor-data - File picker data
//! - GET /gitenberg/v1/admin-notice - Misconfiguration notice
//! - GET|PUT /wp/v2/posts/{id} - Post read (with pull overlay) and write
//! - PUT /wp/v2/posts/{id}/linked-file - Editor file selection
//! - POST /wp/v2/posts/{id}/transition - Status transition (push path)

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use gitenberg_core::{
    Config, EditorData, MemoryPostStore, PostId, PostStore, PullSource, PushOutcome,
    RemoteFileDescriptor, SettingsUpdate, StatusTransition, SyncEngine, LINKED_FILE_META,
    REVISION_MARKER_META,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, Result};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SyncEngine>,
    pub posts: Arc<MemoryPostStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/gitenberg/v1/list-markdown-files", get(list_markdown_files_handler))
        .route(
            "/gitenberg/v1/settings",
            get(get_settings_handler).post(update_settings_handler),
        )
        .route("/gitenberg/v1/editor-data", get(editor_data_handler))
        .route("/gitenberg/v1/admin-notice", get(admin_notice_handler))
        .route("/wp/v2/posts/{id}", get(get_post_handler).put(put_post_handler))
        .route("/wp/v2/posts/{id}/linked-file", put(linked_file_handler))
        .route("/wp/v2/posts/{id}/transition", post(transition_handler))
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub configured: bool,
}

/// GET /health - Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        configured: state.engine.admin_notice().await.is_none(),
    })
}

pub async fn list_markdown_files_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<RemoteFileDescriptor>>> {
    Ok(Json(state.engine.list_files().await?))
}

pub async fn get_settings_handler(State(state): State<AppState>) -> Result<Json<Config>> {
    let config = state
        .engine
        .resolver()
        .resolve()
        .await
        .map_err(|_| ApiError::NotConfigured)?;
    Ok(Json(config))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub async fn update_settings_handler(
    State(state): State<AppState>,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<MessageResponse>> {
    let message = state.engine.resolver().save_settings(update).await?;
    info!("Gitenberg settings updated");
    Ok(Json(MessageResponse { message }))
}

pub async fn editor_data_handler(State(state): State<AppState>) -> Result<Json<EditorData>> {
    state
        .engine
        .editor_data()
        .await
        .map(Json)
        .ok_or(ApiError::NotConfigured)
}

#[derive(Serialize)]
pub struct NoticeResponse {
    pub notice: Option<&'static str>,
}

pub async fn admin_notice_handler(State(state): State<AppState>) -> Json<NoticeResponse> {
    Json(NoticeResponse {
        notice: state.engine.admin_notice().await,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostContent {
    pub raw: String,
}

/// Linked-file metadata exposed with the post.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostMeta {
    #[serde(rename = "gitenberg_linked_markdown_file")]
    pub linked_file: String,
    #[serde(rename = "gitenberg_linked_markdown_file_sha")]
    pub linked_file_sha: String,
}

/// A post serialized for the editor.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: PostId,
    pub content: PostContent,
    pub meta: PostMeta,
    /// `true` when the content came from the linked remote file
    pub loaded_from_github: bool,
}

/// GET /wp/v2/posts/{id} - Serialize a post, overlaying its linked remote file.
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
) -> Result<Json<PostResponse>> {
    let content = state
        .posts
        .content(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("post {}", id)))?;

    let pulled = state.engine.pull(id, content).await;
    debug!("Post {} served from {:?}", id, pulled.source);

    let linked_file = state.posts.get_meta(id, LINKED_FILE_META).await?;
    let linked_file_sha = state.posts.get_meta(id, REVISION_MARKER_META).await?;

    Ok(Json(PostResponse {
        id,
        content: PostContent { raw: pulled.content },
        meta: PostMeta {
            linked_file: linked_file.unwrap_or_default(),
            linked_file_sha: linked_file_sha.unwrap_or_default(),
        },
        loaded_from_github: pulled.source == PullSource::Remote,
    }))
}

#[derive(Debug, Deserialize)]
pub struct PutPostRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct PostIdResponse {
    pub id: PostId,
}

/// PUT /wp/v2/posts/{id} - Store a post body.
pub async fn put_post_handler(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    Json(request): Json<PutPostRequest>,
) -> Json<PostIdResponse> {
    state.posts.upsert_post(id, request.content);
    Json(PostIdResponse { id })
}

#[derive(Debug, Deserialize)]
pub struct LinkedFileRequest {
    #[serde(default)]
    pub path: String,
}

/// PUT /wp/v2/posts/{id}/linked-file - Record the editor's file selection (`""` unlinks).
pub async fn linked_file_handler(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    Json(request): Json<LinkedFileRequest>,
) -> Result<Json<PostIdResponse>> {
    state
        .engine
        .registry()
        .set_linked_path(id, &request.path)
        .await?;
    Ok(Json(PostIdResponse { id }))
}

/// Outcome of the push path, reported back to the host.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PushOutcome> for TransitionResponse {
    fn from(outcome: PushOutcome) -> Self {
        match outcome {
            PushOutcome::Suppressed(reason) => Self {
                outcome: "suppressed".to_string(),
                reason: Some(reason.to_string()),
                ..Default::default()
            },
            PushOutcome::NotConfigured => Self {
                outcome: "not_configured".to_string(),
                ..Default::default()
            },
            PushOutcome::NotLinked => Self {
                outcome: "not_linked".to_string(),
                ..Default::default()
            },
            PushOutcome::Pushed {
                path,
                revision_marker,
                pushed_at,
            } => Self {
                outcome: "pushed".to_string(),
                path: Some(path),
                revision_marker: Some(revision_marker),
                pushed_at: Some(pushed_at),
                ..Default::default()
            },
            PushOutcome::Failed(e) => Self {
                outcome: "failed".to_string(),
                error: Some(e.to_string()),
                ..Default::default()
            },
        }
    }
}

/// POST /wp/v2/posts/{id}/transition - Run the push path.
///
/// Push failures never fail the request: the status change has already happened.
pub async fn transition_handler(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    Json(mut transition): Json<StatusTransition>,
) -> Result<Json<TransitionResponse>> {
    if !state.posts.exists(id).await? {
        return Err(ApiError::NotFound(format!("post {}", id)));
    }

    // The route names the post; any id in the body is ignored
    transition.post_id = id;

    let outcome = state.engine.on_transition(&transition).await;
    Ok(Json(outcome.into()))
}
