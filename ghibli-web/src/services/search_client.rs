//! Managed search backend client
//!
//! Forwards a text query to the managed semantic-search index over the
//! stills corpus. Stateless; one POST per search, no retry (a failed search
//! surfaces to the user immediately).

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use ghibli_common::config::AiBackendConfig;
use ghibli_common::types::RawSearchResult;

/// Fixed result cap per query
const MAX_NUM_RESULTS: u32 = 30;
/// Results scoring below this are dropped by the backend
const SCORE_THRESHOLD: f64 = 0.25;

/// Search backend client errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search backend not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Search backend returned {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_num_results: u32,
    ranking_options: RankingOptions,
}

#[derive(Debug, Serialize)]
struct RankingOptions {
    score_threshold: f64,
}

#[derive(Debug, Deserialize)]
struct SearchBackendResponse {
    data: Vec<RawSearchResult>,
}

/// Managed search backend client
pub struct SearchClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
    search_index: String,
}

impl SearchClient {
    pub fn new(config: &AiBackendConfig) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            search_index: config.search_index.clone(),
        })
    }

    /// Run one semantic search over the corpus.
    ///
    /// Returns raw `{filename, score}` records; callers map them through the
    /// filename parser.
    pub async fn search(&self, query: &str) -> Result<Vec<RawSearchResult>, SearchError> {
        if self.base_url.is_empty() {
            return Err(SearchError::NotConfigured);
        }

        let url = format!("{}/autorag/{}/search", self.base_url, self.search_index);
        let body = SearchRequest {
            query,
            max_num_results: MAX_NUM_RESULTS,
            ranking_options: RankingOptions {
                score_threshold: SCORE_THRESHOLD,
            },
        };

        tracing::debug!(query = %query, "querying search backend");

        let mut request = self.http_client.post(&url).json(&body);
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(status.as_u16(), error_text));
        }

        let parsed: SearchBackendResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Parse(e.to_string()))?;

        tracing::info!(
            query = %query,
            results = parsed.data.len(),
            "search completed"
        );

        Ok(parsed.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = SearchClient::new(&AiBackendConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_fast() {
        let client = SearchClient::new(&AiBackendConfig::default()).unwrap();
        let err = client.search("forest spirits").await.unwrap_err();
        assert!(matches!(err, SearchError::NotConfigured));
    }

    #[test]
    fn request_body_shape() {
        let body = SearchRequest {
            query: "red airplane over hills",
            max_num_results: MAX_NUM_RESULTS,
            ranking_options: RankingOptions {
                score_threshold: SCORE_THRESHOLD,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_num_results"], 30);
        assert_eq!(json["ranking_options"]["score_threshold"], 0.25);
    }
}
