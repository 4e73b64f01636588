//! Client-side rate limiting for embedding calls.
//!
//! An index refresh embeds a whole crawl in a burst, which would blow
//! through provider quotas if sent unchecked. The wrapper gates every batch
//! on a governor limiter, waiting for clearance instead of surfacing
//! provider rejections mid-refresh.

use std::sync::Arc;

use governor::DefaultDirectRateLimiter;
use rig::embeddings::{Embedding, EmbeddingError, EmbeddingModel};
use tracing::{debug_span, info_span, Instrument};

/// An embedding model whose calls wait for rate-limit clearance.
#[derive(Clone)]
pub struct RateLimitedEmbeddingModel<M: EmbeddingModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedEmbeddingModel<M>
where
    M: EmbeddingModel,
{
    /// Wrap `model` so every embedding call is gated by `limiter`.
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }
}

impl<M: EmbeddingModel> EmbeddingModel for RateLimitedEmbeddingModel<M> {
    const MAX_DOCUMENTS: usize = M::MAX_DOCUMENTS;

    fn ndims(&self) -> usize {
        self.model.ndims()
    }

    async fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let batch: Vec<String> = texts.into_iter().collect();
        let call_span = info_span!("embed_batch", size = batch.len());

        self.limiter
            .until_ready()
            .instrument(debug_span!("embed_quota_wait"))
            .await;
        self.model.embed_texts(batch).instrument(call_span).await
    }
}
