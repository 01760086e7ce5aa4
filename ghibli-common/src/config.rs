//! Configuration loading
//!
//! Resolution priority, highest first:
//! 1. Command-line argument
//! 2. Environment variable (`GHIBLI_CONFIG`)
//! 3. Platform config file (`~/.config/ghibli-search/config.toml`)
//! 4. Compiled defaults
//!
//! The compiled defaults are complete enough to boot the service without any
//! file at all; backends left unconfigured simply fail over to placeholder
//! behavior where the API defines one (`/api/random`).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default bind port for ghibli-web
pub const DEFAULT_PORT: u16 = 5860;

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub ai: AiBackendConfig,
    pub storage: StorageConfig,
}

/// Managed AI backend endpoints (search, captioning, text generation)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiBackendConfig {
    /// Base URL of the managed AI service
    pub base_url: String,
    /// Bearer token; empty disables authentication header
    pub api_token: String,
    /// Name of the managed search index over the stills corpus
    pub search_index: String,
    /// Model identifier for query rewriting
    pub rewrite_model: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

/// Managed object storage holding originals and thumbnails
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base URL of the image bucket; empty means not configured
    pub images_base_url: String,
    /// Base URL of the thumbnail bucket; empty means not configured
    pub thumbnails_base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            bind_port: DEFAULT_PORT,
            ai: AiBackendConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for AiBackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: String::new(),
            search_index: "studio-ghibli".to_string(),
            rewrite_model: "@cf/meta/llama-3.1-8b-instruct".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            images_base_url: String::new(),
            thumbnails_base_url: String::new(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration following the resolution priority order.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        // Priority 1: command-line argument
        if let Some(path) = cli_path {
            return Self::from_file(path);
        }

        // Priority 2: environment variable
        if let Ok(path) = std::env::var("GHIBLI_CONFIG") {
            return Self::from_file(Path::new(&path));
        }

        // Priority 3: platform config file
        if let Some(path) = default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // Priority 4: compiled defaults
        Ok(Self::default())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
    }

    /// Whether an object store has been configured at all
    pub fn storage_configured(&self) -> bool {
        !self.storage.images_base_url.is_empty()
    }
}

/// Platform config file path (`<config_dir>/ghibli-search/config.toml`)
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ghibli-search").join("config.toml"))
}
