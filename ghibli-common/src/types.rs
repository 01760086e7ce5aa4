//! Wire types shared between ghibli-web and its clients
//!
//! Field names serialize as camelCase to match the public JSON surface.

use serde::{Deserialize, Serialize};

/// MIME types accepted for an uploaded search image
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Upload size ceiling (10 MiB), enforced on both sides of the wire
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A single search result: one still from the corpus, fully derived from the
/// backend-reported filename plus a relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GhibliImage {
    /// Object key in the image store (unique)
    pub filename: String,
    /// Release year, 0 when the filename could not be parsed
    pub year: u32,
    pub movie_name: String,
    pub description: String,
    /// Slug on ghibli.jp/works/
    pub movie_slug: String,
    /// Full-size image URL for the lightbox
    pub image_url: String,
    /// Pre-generated WebP thumbnail URL for the grid
    pub thumbnail_url: String,
    /// Backend relevance score, non-negative, ordering only
    pub score: f64,
}

/// Raw record as returned by the managed search backend.
/// Tolerant of extra fields the backend may attach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResult {
    pub filename: String,
    pub score: f64,
}

/// Response body of `GET /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<GhibliImage>,
    pub query: String,
}

/// Response body of `GET /api/random`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomResponse {
    pub results: Vec<GhibliImage>,
}

/// Response body of `POST /api/analyze-image`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub description: String,
    pub filename: String,
}

/// Request body of `POST /api/rewrite-query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub description: String,
}

/// Response body of `POST /api/rewrite-query`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteResponse {
    pub search_query: String,
}

/// Flat error body returned by every failing API route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
