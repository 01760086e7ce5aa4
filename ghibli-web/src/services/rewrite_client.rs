//! Managed text-generation backend client for query rewriting
//!
//! Turns a verbose image caption into a short search phrase via the llama
//! rewrite model, then sanitizes the model output server-side. No retry: a
//! rewrite failure propagates and the orchestrator degrades to using the raw
//! caption as the query.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use ghibli_common::config::AiBackendConfig;
use ghibli_common::sanitize_query;

/// Output token cap for the rewrite model
const MAX_TOKENS: u32 = 50;

/// System prompt for the rewrite model
const QUERY_REWRITE_PROMPT: &str = r#"You are a search query writer for a Studio Ghibli movie stills search engine.

Your job: Convert a verbose image description into a short, poetic search phrase that will find similar anime scenes. The search engine uses semantic matching, so your phrase should capture the mood, subject, and atmosphere of the scene.

Your output will be used directly as a search query, so it MUST be a complete, meaningful phrase - not a fragment or incomplete sentence.

RULES:
- Write a COMPLETE phrase (4-8 words) that makes sense on its own
- NEVER end with articles or prepositions (e.g. "a", "an", "the", "of", "with", "in", "on", "to", "for", "and")
- NEVER mention "image", "picture", "shows", "depicts" - describe the scene itself
- Use dreamlike, atmospheric words that evoke Studio Ghibli's visual style
- NO markdown, quotes, or punctuation components or characters
- NO prefixes like "Output:" or "Search:"

EXAMPLES:
Input: "The image shows a young girl flying through clouds on a broomstick with a black cat sitting behind her."
Output: witch girl flying through soft clouds with black cat

Input: "A close up portrait of a young man is presented in the image with a thoughtful expression."
Output: dreaming young man portrait

Input: "A serene forest scene with ancient trees covered in moss and small white spirits standing among the roots."
Output: misty forest with gentle tree spirits

Input: "A red airplane flying over green rolling hills with white clouds in a bright blue sky."
Output: red airplane soaring over green hills

Input: "The image depicts a large castle floating in the sky surrounded by clouds at sunset."
Output: floating castle in golden sunset clouds

Input: "A young woman with long blonde hair sitting alone by a window looking out at the rain falling outside."
Output: lonely girl watching rain by window

Input: "A close-up of a person's face with soft lighting and a melancholic expression."
Output: melancholic portrait with soft lighting

Input: "The screenshot shows a yellow-themed user interface with various buttons."
Output: yellow themed interface design"#;

/// Rewrite backend client errors
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Rewrite backend not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rewrite backend returned {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct RewriteBackendRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct RewriteBackendResponse {
    response: Option<String>,
}

/// Managed text-generation backend client
pub struct RewriteClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
    model: String,
}

impl RewriteClient {
    pub fn new(config: &AiBackendConfig) -> Result<Self, RewriteError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| RewriteError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
            model: config.rewrite_model.clone(),
        })
    }

    /// Rewrite a caption into a sanitized search phrase.
    ///
    /// A model that answers nothing falls back to the caption itself before
    /// sanitization, so the result is always derived from real text.
    pub async fn rewrite_query(&self, description: &str) -> Result<String, RewriteError> {
        if self.base_url.is_empty() {
            return Err(RewriteError::NotConfigured);
        }

        let url = format!("{}/run/{}", self.base_url, self.model);
        let body = RewriteBackendRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: QUERY_REWRITE_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: description,
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        let mut request = self.http_client.post(&url).json(&body);
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RewriteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RewriteError::Api(status.as_u16(), error_text));
        }

        let parsed: RewriteBackendResponse = response
            .json()
            .await
            .map_err(|e| RewriteError::Parse(e.to_string()))?;

        let raw = parsed.response.unwrap_or_else(|| description.to_string());
        let search_query = sanitize_query(&raw);

        tracing::info!(search_query = %search_query, "query rewritten");

        Ok(search_query)
    }
}
