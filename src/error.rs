use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("account already exists")]
    DuplicateAccount,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not authenticated")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("content not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error("internal server error")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    code: u16,
    error_message: String,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => AppError::DuplicateAccount,
            StoreError::Backend(detail) => AppError::Internal(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DuplicateAccount => {
                (StatusCode::BAD_REQUEST, "account already exists".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "invalid credentials".to_string())
            }
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "not authorized".to_string())
            }
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "not authorized for this route".to_string(),
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "content not found".to_string()),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Internal(detail) => {
                // the detail goes to the log, never to the client
                tracing::error!("internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: status.as_u16(),
            error_message,
        });

        (status, body).into_response()
    }
}
