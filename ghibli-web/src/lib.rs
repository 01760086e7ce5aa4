//! ghibli-web library interface
//!
//! Exposes the router and application state for integration testing.

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use ghibli_common::config::ServiceConfig;
use ghibli_common::types::MAX_UPLOAD_BYTES;
use services::{CaptionClient, ObjectStore, RewriteClient, SearchClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub search: Arc<SearchClient>,
    pub caption: Arc<CaptionClient>,
    pub rewrite: Arc<RewriteClient>,
    pub store: Arc<ObjectStore>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let search = Arc::new(SearchClient::new(&config.ai)?);
        let caption = Arc::new(CaptionClient::new(&config.ai)?);
        let rewrite = Arc::new(RewriteClient::new(&config.ai)?);
        let store = Arc::new(ObjectStore::new(&config.storage)?);

        Ok(Self {
            config: Arc::new(config),
            search,
            caption,
            rewrite,
            store,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/search", get(api::search::search_images))
        .route(
            "/api/analyze-image",
            post(api::analyze::analyze_image)
                // Multipart overhead on top of the 10 MiB image cap
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024)),
        )
        .route("/api/rewrite-query", post(api::rewrite::rewrite_query))
        .route("/api/random", get(api::random::random_images))
        .route("/api/image", get(api::image::image_details))
        .route("/images/*path", get(api::assets::serve_image))
        .route("/thumbnails/*path", get(api::assets::serve_thumbnail))
        .route("/health", get(api::health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
