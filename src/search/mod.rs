//! Query resolver module
//!
//! Embeds a free-text query, runs a nearest-neighbor lookup against the
//! freshly rebuilt index, and shapes each match into a ranked snippet with
//! its originating page path and a normalized 0-100 relevance score.

pub mod error;
mod scoring;

pub use error::SearchError;
pub use scoring::Similarity;

use rig::embeddings::EmbeddingModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::index::Database;

/// Default number of results returned per query
pub const DEFAULT_TOP_K: usize = 10;

/// A ranked snippet answering a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHit {
    /// Text of the matched block
    pub text: String,

    /// HTML fragment of the matched block
    pub html: String,

    /// URL path of the page the block came from
    pub path: String,

    /// Normalized relevance score in [0, 100]
    pub score: f64,
}

/// Resolve a query against the index.
///
/// Results preserve the store's return order (nearest first); no re-ranking
/// happens here. `seed` supplies the fallback path for entries stored without
/// a usable source URL.
#[instrument(skip(db, embedder))]
pub async fn search_index<E: EmbeddingModel>(
    db: &Database,
    embedder: &E,
    query: &str,
    seed: &Url,
    limit: usize,
) -> Result<Vec<QueryHit>, SearchError> {
    let query_embedding = embedder
        .embed_text(query)
        .await
        .map_err(|e| SearchError::Embedding(format!("Failed to generate embedding: {}", e)))?;

    let entries = db.nearest(&query_embedding, limit).await?;
    debug!("Vector search returned {} entries", entries.len());

    Ok(entries
        .into_iter()
        .map(|entry| {
            let similarity = match entry.distance {
                Some(distance) => Similarity::Distance(distance),
                None => Similarity::Unknown,
            };
            QueryHit {
                path: result_path(&entry.source_url, seed),
                score: similarity.score(),
                text: entry.text,
                html: entry.html,
            }
        })
        .collect())
}

/// The URL path shown with a result.
///
/// An entry without a parseable source URL falls back to the seed URL's path;
/// an empty path falls back to `/`.
fn result_path(source_url: &str, seed: &Url) -> String {
    let path = match Url::parse(source_url) {
        Ok(url) => url.path().to_string(),
        Err(_) => seed.path().to_string(),
    };

    if path.is_empty() {
        "/".to_string()
    } else {
        path
    }
}
