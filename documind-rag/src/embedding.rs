//! Embedding provider trait and exact-match caching.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};

/// A provider that maps text to fixed-length vectors in a shared semantic space.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. The default [`embed_batch`](EmbeddingProvider::embed_batch)
/// implementation calls [`embed`](EmbeddingProvider::embed) sequentially;
/// backends that support native batching should override it. Batch results
/// must preserve input order and must not drop inputs.
///
/// Output dimensionality is constant for a given provider instance. Transport
/// or quota failures surface as [`RagError::EmbeddingError`] and are never
/// retried inside the core; retry policy belongs to the caller.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Override this method if the backend
    /// supports native batch embedding for better throughput.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

/// An [`EmbeddingProvider`] decorator that memoizes results by exact text match.
///
/// Repeated queries and re-ingested passages skip the external call. Batch
/// requests only forward cache misses, preserving input order. Failures are
/// not cached.
///
/// # Example
///
/// ```rust,ignore
/// use documind_rag::{CachedEmbedder, EmbeddingProvider};
///
/// let embedder = CachedEmbedder::new(Arc::new(backend));
/// let a = embedder.embed("hello").await?;
/// let b = embedder.embed("hello").await?; // served from cache
/// assert_eq!(a, b);
/// ```
pub struct CachedEmbedder {
    inner: Arc<dyn EmbeddingProvider>,
    cache: RwLock<HashMap<String, Vec<f32>>>,
}

impl CachedEmbedder {
    /// Wrap a provider with an exact-match cache.
    pub fn new(inner: Arc<dyn EmbeddingProvider>) -> Self {
        Self { inner, cache: RwLock::new(HashMap::new()) }
    }

    /// Number of distinct texts currently cached.
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}

impl std::fmt::Debug for CachedEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedEmbedder").field("dimensions", &self.inner.dimensions()).finish()
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(hit) = self.cache.read().await.get(text) {
            return Ok(hit.clone());
        }
        let embedding = self.inner.embed(text).await?;
        self.cache.write().await.insert(text.to_string(), embedding.clone());
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut slots: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        {
            let cache = self.cache.read().await;
            for (slot, text) in slots.iter_mut().zip(texts) {
                *slot = cache.get(*text).cloned();
            }
        }

        let miss_positions: Vec<usize> =
            slots.iter().enumerate().filter(|(_, s)| s.is_none()).map(|(i, _)| i).collect();

        if !miss_positions.is_empty() {
            let miss_texts: Vec<&str> = miss_positions.iter().map(|&i| texts[i]).collect();
            let fresh = self.inner.embed_batch(&miss_texts).await?;
            if fresh.len() != miss_texts.len() {
                return Err(RagError::EmbeddingError {
                    provider: "cache".to_string(),
                    message: format!(
                        "backend returned {} embeddings for {} inputs",
                        fresh.len(),
                        miss_texts.len()
                    ),
                });
            }
            let mut cache = self.cache.write().await;
            for (&position, embedding) in miss_positions.iter().zip(fresh) {
                cache.insert(texts[position].to_string(), embedding.clone());
                slots[position] = Some(embedding);
            }
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| RagError::EmbeddingError {
                    provider: "cache".to_string(),
                    message: "batch slot left unfilled".to_string(),
                })
            })
            .collect()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}
