//! HTTP API handlers for ghibli-web

pub mod analyze;
pub mod assets;
pub mod health;
pub mod image;
pub mod random;
pub mod rewrite;
pub mod search;
