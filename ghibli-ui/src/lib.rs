//! # ghibli-ui
//!
//! Client-side logic for the Ghibli visual search front-end:
//! - [`client::ApiClient`]: typed HTTP client over the ghibli-web surface
//! - [`orchestrator::ImageSearchOrchestrator`]: the multi-step image-search
//!   state machine (analyze → rewrite → search) the presentation layer
//!   drives and observes
//!
//! The presentation layer itself (rendering, animation, URL syncing) is out
//! of scope here; it consumes this crate's state snapshots and commands.

pub mod client;
pub mod orchestrator;

pub use client::{ApiClient, ClientError};
pub use orchestrator::{
    GatewayError, ImageSearchGateways, ImageSearchOrchestrator, ImageSearchState, ImageSearchStep,
    StartError, UploadedImage,
};
