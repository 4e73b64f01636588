//! Index refresher module
//!
//! This module owns the vector index: schema management, generation-tagged
//! refresh, and nearest-neighbor lookup over libsql. Each search request
//! rebuilds the index from the blocks its crawl produced; generations make
//! that rebuild safe to race with concurrent readers.

mod database;
pub mod error;
mod schema;

pub use database::Database;
pub use error::DbError;

use rig::embeddings::{Embedding, EmbeddingModel};
use tracing::instrument;

use crate::crawler::ContentBlock;
use crate::error::Error;

/// A content block paired with its embedding, ready for insertion
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// The block being indexed
    pub block: ContentBlock,

    /// Embedding of the block's text
    pub embedding: Embedding,
}

/// An entry returned from a nearest-neighbor lookup
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// Text of the stored block
    pub text: String,

    /// HTML fragment of the stored block
    pub html: String,

    /// URL of the page the block came from
    pub source_url: String,

    /// Cosine distance the store reported for this entry, when available
    pub distance: Option<f64>,
}

/// Embed each block's text, batching within the model's document limit.
#[instrument(skip(embedder, blocks), fields(count = blocks.len()))]
pub async fn embed_blocks<E: EmbeddingModel>(
    embedder: &E,
    blocks: Vec<ContentBlock>,
) -> Result<Vec<NewEntry>, Error> {
    let mut entries = Vec::with_capacity(blocks.len());

    for batch in blocks.chunks(E::MAX_DOCUMENTS.max(1)) {
        let texts: Vec<String> = batch.iter().map(|block| block.text.clone()).collect();
        let embeddings = embedder
            .embed_texts(texts)
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;

        if embeddings.len() != batch.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                embeddings.len()
            )));
        }

        entries.extend(
            batch
                .iter()
                .cloned()
                .zip(embeddings)
                .map(|(block, embedding)| NewEntry { block, embedding }),
        );
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockEmbeddingModel;

    fn block(text: &str) -> ContentBlock {
        ContentBlock {
            text: text.to_string(),
            html: String::new(),
            source_url: "https://example.com/".to_string(),
        }
    }

    #[tokio::test]
    async fn embeds_every_block_in_order() {
        let embedder = MockEmbeddingModel::new(4);
        let blocks = vec![block("first"), block("second"), block("third")];

        let entries = embed_blocks(&embedder, blocks).await.unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].block.text, "first");
        assert_eq!(entries[2].block.text, "third");
        assert_eq!(entries[0].embedding.vec.len(), 4);
    }

    #[tokio::test]
    async fn no_blocks_means_no_entries() {
        let embedder = MockEmbeddingModel::new(4);
        let entries = embed_blocks(&embedder, Vec::new()).await.unwrap();
        assert!(entries.is_empty());
    }
}
