//! Managed object storage client
//!
//! Originals and thumbnails live in two key-addressed buckets exposed over
//! HTTP: `GET <base>/<key>` returns the bytes plus content type, and
//! `GET <base>/?limit=N` lists keys. Used by the image passthrough routes
//! and the random showcase picker.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use ghibli_common::config::StorageConfig;

/// Object storage client errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object storage not configured")]
    NotConfigured,

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Object storage returned {0}")]
    Api(u16),
}

/// A fetched object: raw bytes plus the stored content type
#[derive(Debug)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    objects: Vec<ListedObject>,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    key: String,
}

/// Which of the two buckets to address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Images,
    Thumbnails,
}

/// Managed object storage client
pub struct ObjectStore {
    http_client: reqwest::Client,
    images_base_url: String,
    thumbnails_base_url: String,
}

impl ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            images_base_url: config.images_base_url.clone(),
            thumbnails_base_url: config.thumbnails_base_url.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.images_base_url.is_empty()
    }

    fn base_url(&self, bucket: Bucket) -> Result<&str, StoreError> {
        let base = match bucket {
            Bucket::Images => &self.images_base_url,
            Bucket::Thumbnails => &self.thumbnails_base_url,
        };
        if base.is_empty() {
            return Err(StoreError::NotConfigured);
        }
        Ok(base)
    }

    /// Fetch one object by key.
    pub async fn get(&self, bucket: Bucket, key: &str) -> Result<StoredObject, StoreError> {
        let base = self.base_url(bucket)?;
        let url = format!("{}/{}", base, utf8_percent_encode(key, NON_ALPHANUMERIC));

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(StoreError::Api(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?
            .to_vec();

        Ok(StoredObject { bytes, content_type })
    }

    /// List up to `limit` keys from the images bucket.
    pub async fn list(&self, limit: u32) -> Result<Vec<String>, StoreError> {
        let base = self.base_url(Bucket::Images)?;
        let url = format!("{}/?limit={}", base, limit);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Api(status.as_u16()));
        }

        let listed: ListResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(listed.objects.into_iter().map(|o| o.key).collect())
    }
}
