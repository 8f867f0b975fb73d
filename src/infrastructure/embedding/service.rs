//! Embedding service: provider calls with deterministic fallback
//!
//! This facade never fails. When no provider is configured, or a provider
//! call returns an error, a non-success status or an empty/malformed result,
//! the deterministic fallback embedding is used instead. Batch requests fall
//! back as a unit so vector provenance stays uniform within one answer.

use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, warn};

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, fallback_embedding};
use crate::infrastructure::cache::keys;

/// Upper bound on memoized embeddings held for the process lifetime
const MEMO_CAPACITY: u64 = 10_000;

/// Never-failing embed/embed_batch facade with per-text memoization
#[derive(Debug)]
pub struct EmbeddingService {
    provider: Option<Arc<dyn EmbeddingProvider>>,
    model: String,
    memo: Cache<String, Arc<Vec<f32>>>,
}

impl EmbeddingService {
    pub fn new(provider: Option<Arc<dyn EmbeddingProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            memo: Cache::new(MEMO_CAPACITY),
        }
    }

    /// Service with no external provider; every call takes the fallback path.
    pub fn fallback_only() -> Self {
        Self::new(None, "fallback")
    }

    /// Embeds one text. Identical text yields an identical vector within a
    /// process; results are memoized by a digest of the input.
    pub async fn embed(&self, text: &str) -> Vec<f32> {
        let key = keys::digest(text);
        let vector = self
            .memo
            .get_with(key, async { Arc::new(self.compute(text).await) })
            .await;

        (*vector).clone()
    }

    /// Embeds a batch with one provider call when possible. Any failure,
    /// including a count mismatch or an empty vector in the response, yields
    /// fallback vectors for the entire batch; there is no partial success.
    pub async fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        if texts.is_empty() {
            return Vec::new();
        }

        let vectors = match self.provider_batch(texts).await {
            Some(vectors) => vectors,
            None => texts.iter().map(|t| fallback_embedding(t)).collect(),
        };

        for (text, vector) in texts.iter().zip(vectors.iter()) {
            self.memo
                .insert(keys::digest(text), Arc::new(vector.clone()))
                .await;
        }

        vectors
    }

    async fn compute(&self, text: &str) -> Vec<f32> {
        if let Some(provider) = &self.provider {
            let request = EmbeddingRequest::single(&self.model, text);
            match provider.embed(request).await {
                Ok(response) => match response.first() {
                    Some(embedding) if !embedding.vector().is_empty() => {
                        return embedding.vector().to_vec();
                    }
                    _ => warn!(
                        provider = provider.provider_name(),
                        "provider returned an empty embedding, using fallback"
                    ),
                },
                Err(error) => warn!(
                    provider = provider.provider_name(),
                    %error,
                    "embedding call failed, using fallback"
                ),
            }
        }

        fallback_embedding(text)
    }

    /// One batched provider call; `None` means "fall back for the batch".
    async fn provider_batch(&self, texts: &[String]) -> Option<Vec<Vec<f32>>> {
        let provider = self.provider.as_ref()?;
        let request = EmbeddingRequest::batch(&self.model, texts.to_vec());

        let response = match provider.embed(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(
                    provider = provider.provider_name(),
                    %error,
                    "batch embedding call failed, using fallback for the batch"
                );
                return None;
            }
        };

        if response.embeddings().len() != texts.len() {
            warn!(
                provider = provider.provider_name(),
                expected = texts.len(),
                received = response.embeddings().len(),
                "batch embedding count mismatch, using fallback for the batch"
            );
            return None;
        }

        let mut slots: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for embedding in response.into_embeddings() {
            let index = embedding.index();
            if index >= slots.len() || embedding.vector().is_empty() {
                debug!(index, "discarding malformed batch embedding entry");
                return None;
            }
            slots[index] = Some(embedding.into_vector());
        }

        slots.into_iter().collect()
    }
}
