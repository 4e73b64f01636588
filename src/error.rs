//! Error types for the sitesift crate

use thiserror::Error;

/// Result type for sitesift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sitesift operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Web crawling error
    #[error("Crawl error: {0}")]
    Crawl(String),

    /// Embedding generation error
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Index error: {0}")]
    Index(String),

    /// Search error
    #[error("Search error: {0}")]
    Search(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}
