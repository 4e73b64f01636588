//! # Mock Embedding Model for Testing
//!
//! Provides a `MockEmbeddingModel` that implements the `EmbeddingModel` trait
//! for use in tests. Vectors are deterministic: identical inputs always embed
//! to identical vectors, so nearest-neighbor assertions are stable without
//! making actual API calls.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use rig::embeddings::{Embedding, EmbeddingError, EmbeddingModel};

/// A deterministic embedding model for testing purposes.
///
/// Texts registered via [`with_canned`](MockEmbeddingModel::with_canned) embed
/// to their preset vectors; any other text embeds to a unit vector derived
/// from a hash of the text.
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    dims: usize,
    canned: Arc<HashMap<String, Vec<f64>>>,
}

impl MockEmbeddingModel {
    /// Creates a mock model producing vectors with `dims` dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            canned: Arc::new(HashMap::new()),
        }
    }

    /// Creates a mock model with preset vectors for specific texts.
    pub fn with_canned(
        dims: usize,
        pairs: impl IntoIterator<Item = (String, Vec<f64>)>,
    ) -> Self {
        Self {
            dims,
            canned: Arc::new(pairs.into_iter().collect()),
        }
    }

    fn vector_for(&self, text: &str) -> Vec<f64> {
        if let Some(vec) = self.canned.get(text) {
            return vec.clone();
        }

        let mut out = Vec::with_capacity(self.dims);
        for i in 0..self.dims {
            let mut hasher = DefaultHasher::new();
            (text, i).hash(&mut hasher);
            let raw = hasher.finish();
            out.push((raw as f64 / u64::MAX as f64) * 2.0 - 1.0);
        }

        // Unit length keeps cosine distances in [0, 2].
        let norm = out.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for x in &mut out {
                *x /= norm;
            }
        }
        out
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    const MAX_DOCUMENTS: usize = 1024;

    fn ndims(&self) -> usize {
        self.dims
    }

    async fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts
            .into_iter()
            .map(|text| Embedding {
                vec: self.vector_for(&text),
                document: text,
            })
            .collect())
    }
}
