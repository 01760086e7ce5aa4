//! `GET /api/image?filename=<name>`: parsed details for one still
//!
//! Used by the front-end to deep-link a lightbox straight from the URL.

use axum::extract::Query;
use axum::Json;
use serde::Deserialize;

use ghibli_common::parse_filename;
use ghibli_common::types::GhibliImage;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ImageParams {
    filename: Option<String>,
}

pub async fn image_details(Query(params): Query<ImageParams>) -> ApiResult<Json<GhibliImage>> {
    let filename = params
        .filename
        .as_deref()
        .filter(|f| !f.is_empty())
        .ok_or_else(|| {
            ApiError::BadRequest("Query parameter 'filename' is required".to_string())
        })?;

    Ok(Json(parse_filename(filename, 1.0)))
}
