//! Translation of service errors into HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use todo_auth::AuthError;
use todo_core::TodoError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Todo(#[from] TodoError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Protected route called without a bearer token.
    #[error("not authenticated")]
    MissingToken,

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Path(#[from] PathRejection),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Todo(TodoError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Todo(TodoError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Todo(TodoError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Todo(TodoError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(AuthError::TokenExpired | AuthError::TokenInvalid(_)) => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Auth(AuthError::InvalidGrant(_)) => StatusCode::BAD_REQUEST,
            ApiError::Auth(AuthError::ProviderUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Auth(AuthError::Config(_) | AuthError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Path(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() && status != StatusCode::BAD_GATEWAY {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
            match &self {
                ApiError::Json(rejection) => rejection.body_text(),
                ApiError::Path(rejection) => rejection.body_text(),
                other => other.to_string(),
            }
        };

        let body = Json(json!({ "detail": detail }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
