//! Gateway clients to the managed backends
//!
//! Each client is a stateless request/response forwarder: it translates this
//! service's request shape into the managed backend's shape and back, with
//! its own error enum and timeout. The caption client additionally owns the
//! retry policy for transient analysis failures.

pub mod caption_client;
pub mod object_store;
pub mod placeholders;
pub mod rewrite_client;
pub mod search_client;

pub use caption_client::{CaptionClient, CaptionError};
pub use object_store::{Bucket, ObjectStore, StoreError};
pub use placeholders::placeholder_images;
pub use rewrite_client::{RewriteClient, RewriteError};
pub use search_client::{SearchClient, SearchError};
