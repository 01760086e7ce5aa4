//! `POST /api/rewrite-query` (JSON `{description}`)

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use ghibli_common::types::RewriteResponse;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RewriteBody {
    description: Option<String>,
}

/// Rewrite a caption into a short search phrase. The sanitized result goes
/// back to the client; a backend failure is a 500 which the client absorbs
/// by falling back to the raw caption.
pub async fn rewrite_query(
    State(state): State<AppState>,
    Json(body): Json<RewriteBody>,
) -> ApiResult<Json<RewriteResponse>> {
    let description = body
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Description is required".to_string()))?;

    let search_query = state.rewrite.rewrite_query(description).await.map_err(|e| {
        tracing::error!(error = %e, "query rewriting failed");
        ApiError::backend("Failed to rewrite query")
    })?;

    Ok(Json(RewriteResponse { search_query }))
}
