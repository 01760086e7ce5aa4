//! # Ghibli Search Common Library
//!
//! Shared code for the Ghibli visual search services including:
//! - Domain types (GhibliImage, API request/response shapes)
//! - Filename parsing ("(YEAR) Movie Name/Description.ext")
//! - Movie name to ghibli.jp slug resolution
//! - Image/thumbnail URL construction
//! - Search query sanitization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod image_urls;
pub mod movie_slugs;
pub mod parse_filename;
pub mod sanitize;
pub mod types;

pub use error::{Error, Result};
pub use parse_filename::{parse_filename, parse_search_results};
pub use sanitize::sanitize_query;
pub use types::GhibliImage;
