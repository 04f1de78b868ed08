//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::editor::EditorError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Editor(#[from] EditorError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Prefix a store failure with the action that failed, e.g. `删除失败`
    pub fn store(action: &str, error: StoreError) -> Self {
        let message = format!("{}: {}", action, error);
        match error {
            StoreError::NotFound { .. } => ApiError::NotFound,
            StoreError::Conflict { .. } => ApiError::Conflict(message),
            StoreError::Invalid(_) => ApiError::BadRequest(message),
            _ => ApiError::Internal(anyhow::anyhow!(message)),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        ApiError::store("读取失败", error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            ApiError::Auth(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Editor(EditorError::Invalid(_)) => StatusCode::BAD_REQUEST,
            ApiError::Editor(EditorError::Store(StoreError::Conflict { .. })) => {
                StatusCode::CONFLICT
            }
            ApiError::Editor(EditorError::Store(StoreError::NotFound { .. })) => {
                StatusCode::NOT_FOUND
            }
            ApiError::Editor(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
