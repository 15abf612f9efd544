//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, SyncError};
use thiserror::Error;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),

    /// Repository or license error.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Remote store read failed.
    #[error(transparent)]
    Remote(#[from] SyncError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => match err {
                DomainError::WriteDenied { .. } => StatusCode::FORBIDDEN,
                DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::License(_) => StatusCode::BAD_REQUEST,
                DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Remote(SyncError::InvalidTable(_)) => StatusCode::BAD_REQUEST,
            ApiError::Remote(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
