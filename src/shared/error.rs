use crate::shared::i18n;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

/// Single entry of the error envelope
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorObject {
    pub status: u16,
    pub detail: String,
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorObject>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::ValidationError(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg,
            AppError::DatabaseError(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::InternalServerError(e) => {
                tracing::error!("Internal server error: {:?}", e);
                "Internal server error".to_string()
            }
        };

        let body = ErrorResponse {
            errors: vec![ErrorObject {
                status: status.as_u16(),
                detail: i18n::translate_current(&message).into_owned(),
            }],
        };

        (status, Json(body)).into_response()
    }
}
