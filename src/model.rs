//! # Embedding Client Module
//!
//! This module provides the embedding side of the pipeline, with built-in
//! rate limiting to prevent API quota exhaustion.
//!
//! ## Key Components
//!
//! - `RateLimitedEmbeddingModel`: A wrapper that adds rate limiting to any embedding model
//! - `new_gemini_from_env`: Constructor for the default Gemini-backed embedder
//! - `MockEmbeddingModel`: A deterministic embedder for tests
//!
//! The `rig` `EmbeddingModel` trait is the seam between the pipeline and the
//! actual model provider; everything downstream (index refresh, query
//! resolution) is generic over it.

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use rig::providers::gemini;

pub mod mock_model;
pub mod ratelimited_embedding;

pub use mock_model::MockEmbeddingModel;
pub use ratelimited_embedding::RateLimitedEmbeddingModel;

/// The default embedder type used by the server binary.
pub type GeminiEmbedder = RateLimitedEmbeddingModel<gemini::embedding::EmbeddingModel>;

/// Build a rate-limited Gemini embedding model from the `GEMINI_API_KEY`
/// environment variable.
pub fn new_gemini_from_env() -> GeminiEmbedder {
    let gemini_api_key =
        std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY environment variable must be set");
    new_gemini(gemini::Client::new(&gemini_api_key))
}

/// Build a rate-limited embedding model on top of an existing Gemini client.
pub fn new_gemini(gemini_client: gemini::Client) -> GeminiEmbedder {
    let embedding_limiter = RateLimiter::direct(Quota::per_minute(
        NonZeroU32::new(1000).expect("must create rate limit"),
    ));
    RateLimitedEmbeddingModel::new(
        gemini_client.embedding_model(gemini::embedding::EMBEDDING_004),
        embedding_limiter,
    )
}
