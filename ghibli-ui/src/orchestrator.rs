//! Image-search orchestration state machine
//!
//! One upload drives a three-step pipeline: analyze the image into a
//! caption, rewrite the caption into a short query, search the corpus with
//! it. The orchestrator owns the state record for the current attempt; the
//! presentation layer issues commands (`start`, `retry`, `clear`) and
//! observes snapshots via a broadcast subscription.
//!
//! Policy decisions carried from the product:
//! - at most one attempt in flight; concurrent starts are rejected, never
//!   interleaved
//! - a rewrite failure does not fail the attempt; the raw caption becomes
//!   the query (always return something searchable)
//! - a search failure is terminal for the attempt
//! - retry is always user-initiated, from the error state, with the
//!   retained upload

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex, RwLock};

use ghibli_common::types::{GhibliImage, ALLOWED_IMAGE_TYPES, MAX_UPLOAD_BYTES};

/// Event channel capacity; an attempt emits at most five snapshots
const EVENT_CAPACITY: usize = 16;

/// Where the current attempt stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSearchStep {
    Idle,
    Analyzing,
    Rewriting,
    Searching,
    Done,
    Error,
}

impl ImageSearchStep {
    /// True while a gateway call for this attempt has not settled
    pub fn is_in_flight(self) -> bool {
        matches!(self, Self::Analyzing | Self::Rewriting | Self::Searching)
    }
}

/// State record for the current attempt. Fields populate monotonically as
/// the step advances and reset together on idle.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSearchState {
    pub step: ImageSearchStep,
    /// Display name of the in-flight upload, set from analyzing onward
    pub filename: Option<String>,
    /// Caption from the analysis gateway, set from rewriting onward
    pub description: Option<String>,
    /// Final query, set from searching onward
    pub search_query: Option<String>,
    /// Short failure message, only in the error state
    pub error: Option<String>,
}

impl Default for ImageSearchState {
    fn default() -> Self {
        Self {
            step: ImageSearchStep::Idle,
            filename: None,
            description: None,
            search_query: None,
            error: None,
        }
    }
}

/// An upload as selected or dropped by the user
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Gateway failure, already reduced to a user-presentable message
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct GatewayError(pub String);

/// The three backend calls an attempt sequences through
#[async_trait]
pub trait ImageSearchGateways: Send + Sync {
    async fn analyze(&self, image: &UploadedImage) -> Result<String, GatewayError>;
    async fn rewrite(&self, description: &str) -> Result<String, GatewayError>;
    async fn search(&self, query: &str) -> Result<Vec<GhibliImage>, GatewayError>;
}

/// Synchronous rejections at the orchestrator boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("Please upload a JPEG, PNG, or WebP image")]
    UnsupportedType,

    #[error("Image must be smaller than 10MB")]
    TooLarge,

    #[error("An image search is already running")]
    AttemptInFlight,

    #[error("No upload retained to retry")]
    NothingToRetry,

    #[error("No completed image search to reuse")]
    NothingToReuse,
}

/// The multi-step image-search state machine.
///
/// Cheap to clone: a handle over shared inner state, so a presentation
/// layer can hand copies to event callbacks while the attempt task holds
/// its own.
pub struct ImageSearchOrchestrator<G: ImageSearchGateways + 'static> {
    inner: Arc<Inner<G>>,
}

impl<G: ImageSearchGateways + 'static> Clone for ImageSearchOrchestrator<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<G> {
    gateways: G,
    state: RwLock<ImageSearchState>,
    /// Upload retained for a manual retry of the current attempt
    retained: Mutex<Option<UploadedImage>>,
    /// Results of the last settled search, outside the state record
    results: RwLock<Vec<GhibliImage>>,
    events: broadcast::Sender<ImageSearchState>,
}

impl<G: ImageSearchGateways + 'static> ImageSearchOrchestrator<G> {
    pub fn new(gateways: G) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                gateways,
                state: RwLock::new(ImageSearchState::default()),
                retained: Mutex::new(None),
                results: RwLock::new(Vec::new()),
                events,
            }),
        }
    }

    /// The gateway implementation this orchestrator drives
    pub fn gateways(&self) -> &G {
        &self.inner.gateways
    }

    /// Snapshot of the current state record
    pub async fn state(&self) -> ImageSearchState {
        self.inner.state.read().await.clone()
    }

    /// Results of the last settled search
    pub async fn latest_results(&self) -> Vec<GhibliImage> {
        self.inner.results.read().await.clone()
    }

    /// Subscribe to state snapshots, one per transition
    pub fn subscribe(&self) -> broadcast::Receiver<ImageSearchState> {
        self.inner.events.subscribe()
    }

    /// Begin an attempt for an upload. Validates synchronously, rejects a
    /// second start while one is in flight, then runs the pipeline on a
    /// spawned task.
    pub async fn start(&self, image: UploadedImage) -> Result<(), StartError> {
        validate_upload(&image)?;

        {
            let mut state = self.inner.state.write().await;
            if state.step.is_in_flight() {
                return Err(StartError::AttemptInFlight);
            }
            *state = ImageSearchState {
                step: ImageSearchStep::Analyzing,
                filename: Some(image.name.clone()),
                description: None,
                search_query: None,
                error: None,
            };
        }
        *self.inner.retained.lock().await = Some(image.clone());
        self.emit().await;

        let orchestrator = self.clone();
        tokio::spawn(async move {
            orchestrator.run_attempt(image).await;
        });

        Ok(())
    }

    /// Re-run the retained upload after a failure. User-initiated only.
    pub async fn retry(&self) -> Result<(), StartError> {
        let retained = self.inner.retained.lock().await.clone();
        match retained {
            Some(image) => self.start(image).await,
            None => Err(StartError::NothingToRetry),
        }
    }

    /// Discard the attempt: retained upload, results, and all state fields.
    pub async fn clear(&self) {
        *self.inner.retained.lock().await = None;
        self.inner.results.write().await.clear();
        *self.inner.state.write().await = ImageSearchState::default();
        self.emit().await;
    }

    /// Plain text search outside the image pipeline. Rejected while an
    /// attempt is in flight rather than interleaved. Resets the image state
    /// unless the caller is re-running a query that came from an upload.
    pub async fn new_search(
        &self,
        query: &str,
        preserve_image_state: bool,
    ) -> Result<Vec<GhibliImage>, StartError> {
        if self.inner.state.read().await.step.is_in_flight() {
            return Err(StartError::AttemptInFlight);
        }

        if !preserve_image_state {
            *self.inner.retained.lock().await = None;
            *self.inner.state.write().await = ImageSearchState::default();
            self.emit().await;
        }

        match self.inner.gateways.search(query).await {
            Ok(results) => {
                *self.inner.results.write().await = results.clone();
                Ok(results)
            }
            Err(e) => {
                tracing::error!(error = %e, query = %query, "search failed");
                self.inner.results.write().await.clear();
                Ok(Vec::new())
            }
        }
    }

    /// Re-run the query of a completed attempt without re-running the
    /// analysis and rewrite steps.
    pub async fn repeat_image_query(&self) -> Result<Vec<GhibliImage>, StartError> {
        let query = {
            let state = self.inner.state.read().await;
            if state.step != ImageSearchStep::Done {
                return Err(StartError::NothingToReuse);
            }
            state.search_query.clone().ok_or(StartError::NothingToReuse)?
        };
        self.new_search(&query, true).await
    }

    async fn run_attempt(&self, image: UploadedImage) {
        // Step 1: caption the upload
        let description = match self.inner.gateways.analyze(&image).await {
            Ok(description) => description,
            Err(e) => {
                tracing::error!(error = %e, filename = %image.name, "image analysis failed");
                self.fail(e.0).await;
                return;
            }
        };

        {
            let mut state = self.inner.state.write().await;
            state.step = ImageSearchStep::Rewriting;
            state.description = Some(description.clone());
        }
        self.emit().await;

        // Step 2: rewrite; a failure degrades to the caption as the query
        let search_query = match self.inner.gateways.rewrite(&description).await {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(error = %e, "query rewriting failed, using description as fallback");
                description.clone()
            }
        };

        {
            let mut state = self.inner.state.write().await;
            state.step = ImageSearchStep::Searching;
            state.search_query = Some(search_query.clone());
        }
        self.emit().await;

        // Step 3: search with the final query
        match self.inner.gateways.search(&search_query).await {
            Ok(results) => {
                *self.inner.results.write().await = results;
                // The upload has served its purpose; only a failed attempt
                // keeps it around for retry
                *self.inner.retained.lock().await = None;
                self.inner.state.write().await.step = ImageSearchStep::Done;
                self.emit().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "image search failed at the search step");
                self.fail(e.0).await;
            }
        }
    }

    async fn fail(&self, message: String) {
        self.inner.results.write().await.clear();
        {
            let mut state = self.inner.state.write().await;
            state.step = ImageSearchStep::Error;
            state.error = Some(message);
        }
        self.emit().await;
    }

    async fn emit(&self) {
        // No subscribers is fine; snapshots are also pollable via state()
        let _ = self.inner.events.send(self.inner.state.read().await.clone());
    }
}

fn validate_upload(image: &UploadedImage) -> Result<(), StartError> {
    if !ALLOWED_IMAGE_TYPES.contains(&image.mime_type.as_str()) {
        return Err(StartError::UnsupportedType);
    }
    if image.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(StartError::TooLarge);
    }
    Ok(())
}
