//! Managed captioning backend client
//!
//! Sends an uploaded image to the vision backend and returns the generated
//! description. Captioning is the flakiest backend in the chain, so this
//! client carries the retry policy: up to two extra attempts with exponential
//! backoff, except for two known backend signatures (service overload, rate
//! limiting) which abort the loop on first sight.

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use ghibli_common::config::AiBackendConfig;

/// Extra attempts after the first failure
const MAX_RETRIES: u32 = 2;
/// Backoff base delay, doubled per attempt
const BACKOFF_BASE: Duration = Duration::from_secs(1);
/// Backend error signatures that are never worth retrying:
/// 1031 = service overload, 1015 = rate limited
const NON_RETRYABLE_SIGNATURES: &[&str] = &["error code: 1031", "error code: 1015"];

/// Captioning backend client errors
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("Captioning backend not configured")]
    NotConfigured,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Captioning backend returned {0}: {1}")]
    Api(u16, String),

    #[error("Captioning failed: {0}")]
    Conversion(String),

    #[error("No description generated from image")]
    EmptyResult,
}

/// Conversion result from the captioning backend.
/// `format == "error"` or missing `data` is a failure.
#[derive(Debug, Deserialize)]
struct ConversionResult {
    format: String,
    data: Option<String>,
    error: Option<String>,
}

/// Managed captioning backend client
pub struct CaptionClient {
    http_client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl CaptionClient {
    pub fn new(config: &AiBackendConfig) -> Result<Self, CaptionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CaptionError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            api_token: config.api_token.clone(),
        })
    }

    /// Describe an uploaded image, retrying transient failures.
    pub async fn describe_image(
        &self,
        name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, CaptionError> {
        let mut last_error = CaptionError::EmptyResult;

        for attempt in 0..=MAX_RETRIES {
            match self.describe_once(name, bytes.clone(), mime_type).await {
                Ok(description) => return Ok(description),
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!(
                        attempt = attempt + 1,
                        error = %message,
                        "image analysis attempt failed"
                    );

                    let non_retryable = is_non_retryable(&message);
                    last_error = err;

                    if non_retryable {
                        tracing::error!("captioning backend refused the request, skipping retries");
                        break;
                    }

                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(backoff_delay(attempt)).await;
                    }
                }
            }
        }

        Err(last_error)
    }

    async fn describe_once(
        &self,
        name: &str,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<String, CaptionError> {
        if self.base_url.is_empty() {
            return Err(CaptionError::NotConfigured);
        }

        let url = format!("{}/to-markdown", self.base_url);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(name.to_string())
            .mime_str(mime_type)
            .map_err(|e| CaptionError::Network(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let mut request = self.http_client.post(&url).multipart(form);
        if !self.api_token.is_empty() {
            request = request.bearer_auth(&self.api_token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CaptionError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CaptionError::Api(status.as_u16(), error_text));
        }

        let result: ConversionResult = response
            .json()
            .await
            .map_err(|e| CaptionError::Network(e.to_string()))?;

        if result.format == "error" {
            return Err(CaptionError::Conversion(
                result
                    .error
                    .unwrap_or_else(|| "Failed to analyze image".to_string()),
            ));
        }

        match result.data {
            Some(data) if !data.is_empty() => Ok(data),
            _ => Err(CaptionError::EmptyResult),
        }
    }
}

/// Whether an error message carries one of the known non-retryable signatures
fn is_non_retryable(message: &str) -> bool {
    NON_RETRYABLE_SIGNATURES.iter().any(|s| message.contains(s))
}

/// Exponential backoff: 1s, 2s, 4s for attempts 0, 1, 2
fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.pow(attempt)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Minimal backend stub: counts requests and answers every one with a
    /// 500 carrying the given body.
    async fn failing_backend(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                // Drain the multipart request until the client goes quiet,
                // then answer and close so each attempt reconnects
                let mut buf = [0u8; 4096];
                loop {
                    match tokio::time::timeout(
                        Duration::from_millis(100),
                        socket.read(&mut buf),
                    )
                    .await
                    {
                        Ok(Ok(n)) if n > 0 => continue,
                        _ => break,
                    }
                }

                let response = format!(
                    "HTTP/1.1 500 Internal Server Error\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn stub_config(base_url: String) -> AiBackendConfig {
        AiBackendConfig {
            base_url,
            ..AiBackendConfig::default()
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(2), Duration::from_secs(4));
    }

    #[test]
    fn known_signatures_are_non_retryable() {
        assert!(is_non_retryable("upstream said error code: 1031"));
        assert!(is_non_retryable("error code: 1015"));
        assert!(!is_non_retryable("connection reset by peer"));
        assert!(!is_non_retryable("error code: 9999"));
    }

    #[tokio::test]
    async fn non_retryable_signature_stops_after_one_attempt() {
        let (base_url, hits) = failing_backend("error code: 1031").await;
        let client = CaptionClient::new(&stub_config(base_url)).unwrap();

        let start = std::time::Instant::now();
        let err = client
            .describe_image("scene.png", vec![0u8; 8], "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, CaptionError::Api(500, _)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        // The loop must abort before the first backoff wait
        assert!(start.elapsed() < BACKOFF_BASE);
    }

    #[tokio::test]
    async fn retryable_failure_exhausts_the_attempt_budget() {
        let (base_url, hits) = failing_backend("backend exploded").await;
        let client = CaptionClient::new(&stub_config(base_url)).unwrap();

        let start = std::time::Instant::now();
        let err = client
            .describe_image("scene.png", vec![0u8; 8], "image/png")
            .await
            .unwrap_err();

        assert!(matches!(err, CaptionError::Api(500, _)));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        // Two backoff waits of 1s and 2s sit between the three attempts
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn unconfigured_backend_is_retried_with_backoff() {
        let client = CaptionClient::new(&AiBackendConfig::default()).unwrap();

        let start = std::time::Instant::now();
        let err = client
            .describe_image("scene.png", vec![0u8; 8], "image/png")
            .await
            .unwrap_err();

        // NotConfigured is retried (it is not a known signature), so the
        // two backoff waits of 1s and 2s must have elapsed
        assert!(matches!(err, CaptionError::NotConfigured));
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
