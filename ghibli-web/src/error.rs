//! API error type for ghibli-web
//!
//! Every failure crossing the HTTP boundary becomes a flat JSON body
//! `{"error": "...", "details"?: "..."}` with an appropriate status code.
//! Technical detail is logged; the `details` field is only populated where
//! the route contract defines it (image analysis).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use ghibli_common::types::ErrorResponse;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Backend failure surfaced with a short user-facing message (500)
    #[error("{message}")]
    Backend {
        message: String,
        /// Technical detail, exposed only where the route defines it
        details: Option<String>,
    },

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            details: None,
        }
    }

    pub fn backend_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            details: Some(details.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Backend { message, details } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message, details)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg, None),
            ApiError::Other(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), None),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
