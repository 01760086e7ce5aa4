//! `GET /api/search?q=<text>`

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use ghibli_common::parse_search_results;
use ghibli_common::types::SearchResponse;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// Text search over the corpus. Backend failures surface as a generic
/// search error; there is no automatic retry on this path.
pub async fn search_images(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'q' is required".to_string()))?;

    let raw = state.search.search(query).await.map_err(|e| {
        tracing::error!(error = %e, query = %query, "search error");
        ApiError::backend("Failed to perform search")
    })?;

    Ok(Json(SearchResponse {
        results: parse_search_results(&raw),
        query: query.to_string(),
    }))
}
