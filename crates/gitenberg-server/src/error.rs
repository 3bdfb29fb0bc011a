//! Error types for the HTTP adapter.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gitenberg_core::{ClientError, SettingsError, StoreError, SyncError};
use serde::Serialize;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", gitenberg_core::MISSING_CREDENTIALS_MESSAGE)]
    NotConfigured,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidSettings(String),

    #[error("GitHub error: {0}")]
    Remote(ClientError),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<SyncError> for ApiError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Config(_) => ApiError::NotConfigured,
            SyncError::Remote(ClientError::NotFound(path)) => ApiError::NotFound(path),
            SyncError::Remote(e) => ApiError::Remote(e),
            SyncError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::PostNotFound(id) => ApiError::NotFound(format!("post {}", id)),
            other => ApiError::Store(other),
        }
    }
}

impl From<SettingsError> for ApiError {
    fn from(e: SettingsError) -> Self {
        match e {
            SettingsError::MissingRepoOrToken => ApiError::InvalidSettings(e.to_string()),
            SettingsError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
            code: &'static str,
        }

        let (status, code) = match &self {
            ApiError::NotConfigured => (StatusCode::BAD_REQUEST, "NOT_CONFIGURED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::InvalidSettings(_) => (StatusCode::BAD_REQUEST, "MISSING_DATA"),
            ApiError::Remote(_) => (StatusCode::BAD_GATEWAY, "GITHUB_ERROR"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        let body = ErrorBody {
            error: self.to_string(),
            code,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
