use crate::model::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burrow_core::CoreError;
use burrow_redirector::RedirectorError;
use burrow_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

/// The single place where service errors become HTTP statuses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        AppError::Validation(value.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        AppError::Validation(value.body_text())
    }
}

impl From<ShortenerError> for AppError {
    fn from(value: ShortenerError) -> Self {
        match value {
            ShortenerError::InvalidUrl(_) | ShortenerError::InvalidAlias(_) => {
                AppError::Validation(value.to_string())
            }
            ShortenerError::AliasConflict(code) => {
                AppError::Conflict(format!("short code '{code}' is already in use"))
            }
            ShortenerError::Storage(_) | ShortenerError::Generator(_) => {
                AppError::Internal(value.to_string())
            }
        }
    }
}

impl From<RedirectorError> for AppError {
    fn from(value: RedirectorError) -> Self {
        match value {
            RedirectorError::NotFound(code) => {
                AppError::NotFound(format!("short code '{code}' not found"))
            }
            RedirectorError::Storage(err) => AppError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            AppError::Internal(message) => {
                error!(error = %message, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
