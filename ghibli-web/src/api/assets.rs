//! `GET /images/*` and `GET /thumbnails/*`: raw bytes from object storage
//!
//! Keys are immutable once uploaded, so both routes send a year-long
//! immutable cache header. These routes answer plain text on failure, not
//! JSON; they are consumed by `<img>` tags, not API clients.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::services::{Bucket, StoreError};
use crate::AppState;

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

/// Full-size original from the images bucket, content type as stored.
pub async fn serve_image(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_object(&state, Bucket::Images, &path, None).await
}

/// Pre-generated thumbnail; always WebP regardless of stored metadata.
pub async fn serve_thumbnail(State(state): State<AppState>, Path(path): Path<String>) -> Response {
    serve_object(&state, Bucket::Thumbnails, &path, Some("image/webp")).await
}

async fn serve_object(
    state: &AppState,
    bucket: Bucket,
    key: &str,
    content_type_override: Option<&str>,
) -> Response {
    if key.is_empty() {
        return (StatusCode::BAD_REQUEST, "Image path is required").into_response();
    }

    match state.store.get(bucket, key).await {
        Ok(object) => {
            let content_type = content_type_override
                .map(str::to_string)
                .unwrap_or(object.content_type);
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CACHE_CONTROL, IMMUTABLE_CACHE.to_string()),
                ],
                object.bytes,
            )
                .into_response()
        }
        Err(StoreError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "Image not found").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, key = %key, "image serving error");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load image").into_response()
        }
    }
}
