//! HTTP-facing application errors

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::query::QueryError;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Query(QueryError::UnknownEntity(_)) | AppError::NotFound(_) => {
                StatusCode::NOT_FOUND
            },
            AppError::Query(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Query(QueryError::UnknownEntity(_)) | AppError::NotFound(_) => "NOT_FOUND",
            AppError::Query(QueryError::UnknownFilter(_)) => "UNKNOWN_FILTER",
            AppError::Query(QueryError::InvalidFilterValue { .. }) => "INVALID_FILTER_VALUE",
            AppError::Query(QueryError::InvalidLimit(_)) => "INVALID_LIMIT",
            AppError::Query(QueryError::InvalidRequest(_)) => "BAD_REQUEST",
            _ => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(self.code(), message))).into_response()
    }
}
