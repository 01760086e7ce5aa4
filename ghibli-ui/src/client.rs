//! Typed HTTP client over the ghibli-web surface
//!
//! One `ApiClient` per front-end instance; it implements the orchestrator's
//! gateway trait so the state machine runs against the real service, and
//! exposes the extra routes (random showcase, deep-link details) the
//! presentation layer uses directly.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use ghibli_common::types::{
    AnalyzeResponse, ErrorResponse, GhibliImage, RandomResponse, RewriteRequest, RewriteResponse,
    SearchResponse,
};

use crate::orchestrator::{GatewayError, ImageSearchGateways, UploadedImage};

/// Per-call timeout; generous because captioning a 10 MiB upload is slow
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        details: Option<String>,
    },
}

impl From<ClientError> for GatewayError {
    fn from(e: ClientError) -> Self {
        GatewayError(e.to_string())
    }
}

/// HTTP client for the ghibli-web API
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// `GET /api/search?q=` → results plus the echoed query
    pub async fn search(&self, query: &str) -> Result<SearchResponse, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/api/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// `POST /api/analyze-image` → caption for the upload
    pub async fn analyze_image(&self, image: &UploadedImage) -> Result<AnalyzeResponse, ClientError> {
        let part = reqwest::multipart::Part::bytes(image.bytes.clone())
            .file_name(image.name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .http_client
            .post(format!("{}/api/analyze-image", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// `POST /api/rewrite-query` → sanitized search phrase
    pub async fn rewrite_query(&self, description: &str) -> Result<RewriteResponse, ClientError> {
        let response = self
            .http_client
            .post(format!("{}/api/rewrite-query", self.base_url))
            .json(&RewriteRequest {
                description: description.to_string(),
            })
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// `GET /api/random` → showcase images for the landing page
    pub async fn random(&self) -> Result<RandomResponse, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/api/random", self.base_url))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_json(response).await
    }

    /// `GET /api/image?filename=` → parsed details for a deep-linked still
    pub async fn image_details(&self, filename: &str) -> Result<GhibliImage, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/api/image", self.base_url))
            .query(&[("filename", filename)])
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Self::parse_json(response).await
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if !status.is_success() {
            // Failing routes answer a flat {error, details?} body
            let body: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
                error: format!("Request failed with status {}", status.as_u16()),
                details: None,
            });
            if let Some(details) = &body.details {
                tracing::debug!(status = status.as_u16(), details = %details, "api error detail");
            }
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body.error,
                details: body.details,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }
}

#[async_trait]
impl ImageSearchGateways for ApiClient {
    async fn analyze(&self, image: &UploadedImage) -> Result<String, GatewayError> {
        Ok(self.analyze_image(image).await?.description)
    }

    async fn rewrite(&self, description: &str) -> Result<String, GatewayError> {
        Ok(self.rewrite_query(description).await?.search_query)
    }

    async fn search(&self, query: &str) -> Result<Vec<GhibliImage>, GatewayError> {
        Ok(self.search(query).await?.results)
    }
}
