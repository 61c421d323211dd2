//! API Error Handling
//!
//! Failures of the read endpoints and request extraction. Create outcomes
//! travel in their own envelope and never pass through here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::repository::store::StoreError;
use crate::service::workspace_service::WorkspaceError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    NotFound(String),
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Store(err) => {
                tracing::error!("Store error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<WorkspaceError> for ApiError {
    fn from(err: WorkspaceError) -> Self {
        match err {
            WorkspaceError::Store(err) => ApiError::Store(err),
            other => ApiError::NotFound(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
