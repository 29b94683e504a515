use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::{
    repository::RepositoryError,
    services::{auth::AuthError, images::ImageError},
};

/// Message shown for any incomplete admin form.
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{what} not found")]
    NotFound { what: &'static str },

    #[error("{0}")]
    Validation(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &'static str) -> Self {
        AppError::NotFound { what }
    }

    pub fn missing_fields() -> Self {
        AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string())
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::BadRequest(_) | AppError::Image(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Unauthorized(AuthError::Forbidden) => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::Unauthorized(AuthError::Hashing(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Repository(RepositoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            AppError::Repository(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Storage details stay in the logs.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Something went wrong, please try again".to_string()
        } else {
            self.to_string()
        };

        let mut body = json!({
            "success": false,
            "error": { "code": code, "message": message },
        });
        if status == StatusCode::NOT_FOUND {
            body["error"]["recovery"] = json!({ "action": "go_home", "href": "/" });
        }

        (status, Json(body)).into_response()
    }
}
