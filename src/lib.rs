//! # Sitesift - Website Semantic Search
//!
//! This crate turns any website into a searchable corpus on demand. A single
//! request carries a seed URL and a free-text query through the full pipeline:
//! crawl the site's internal pages, extract heading/paragraph content blocks,
//! embed them, rebuild a vector index, and answer the query with ranked
//! snippets.
//!
//! ## Features
//!
//! - Breadth-first crawling restricted to the seed's host
//! - Heading/paragraph content extraction from raw HTML
//! - Rate-limited embedding generation via rig
//! - Generation-tagged vector indexing with LibSQL
//! - Nearest-neighbor search with normalized 0-100 relevance scores
//! - A small axum HTTP surface with per-IP rate limiting and CORS
//! - Async API with Tokio
//! - Robust error handling and logging
//!
//! ## Example
//!
//! ```rust,no_run
//! use sitesift::crawler::{crawl_site, http_client, CrawlerConfig};
//! use sitesift::index::{embed_blocks, Database};
//! use sitesift::model::MockEmbeddingModel;
//! use sitesift::search::search_index;
//! use rig::embeddings::EmbeddingModel;
//! use url::Url;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::default();
//!     let client = http_client(&config)?;
//!     let seed = Url::parse("https://example.com/")?;
//!
//!     let report = crawl_site(&client, &seed, &config).await?;
//!
//!     let embedder = MockEmbeddingModel::new(8);
//!     let db = Database::new_from_path("index.db", embedder.ndims()).await?;
//!     let entries = embed_blocks(&embedder, report.blocks).await?;
//!     db.replace_all(&entries).await?;
//!
//!     let hits = search_index(&db, &embedder, "pricing plans", &seed, 10).await?;
//!     for hit in hits {
//!         println!("{:>6.2}  {}  {}", hit.score, hit.path, hit.text);
//!     }
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

// Pipeline modules
pub mod crawler;
pub mod index;
pub mod search;
pub mod server;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
