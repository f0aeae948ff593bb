//! Query-side retrieval: embed, search, filter, deduplicate, rank.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Chunk, RetrievalResult, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Retrieves the passages most relevant to a query from the shared index.
///
/// Over-fetches `top_k * overfetch_factor` candidates so that score
/// filtering and overlap deduplication still leave enough survivors. Never
/// pads: if fewer than `top_k` candidates survive, fewer are returned, and
/// an empty index yields an empty result rather than an error.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<RwLock<VectorIndex>>,
    overfetch_factor: usize,
    request_timeout: Option<Duration>,
}

impl Retriever {
    /// Create a retriever over a shared index.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<RwLock<VectorIndex>>,
        overfetch_factor: usize,
        request_timeout: Option<Duration>,
    ) -> Self {
        Self { embedder, index, overfetch_factor, request_timeout }
    }

    /// Retrieve up to `top_k` deduplicated passages scoring at least
    /// `min_score` against the query.
    ///
    /// Results are ordered by descending score with a stable tie-break on
    /// the chunk sequence index; ranks are assigned 1..n. The query is
    /// embedded outside any lock, and the index lock is held only for the
    /// search itself.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] if embedding the query fails or
    /// exceeds the configured deadline.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<RetrievalResult> {
        if self.index.read().await.is_empty() {
            debug!(query_len = query.len(), "retrieve on empty index");
            return Ok(RetrievalResult::default());
        }

        let query_vector = self.embed_query(query).await?;

        let fetch = top_k.saturating_mul(self.overfetch_factor).max(top_k);
        let mut candidates: Vec<(Chunk, f32)> = {
            let index = self.index.read().await;
            let hits = index.search(&query_vector, fetch)?;
            hits.into_iter()
                .filter(|(_, score)| *score >= min_score)
                .filter_map(|(id, score)| index.get(id).map(|e| (e.chunk.clone(), score)))
                .collect()
        };
        candidates.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.seq.cmp(&b.0.seq))
        });

        // Greedy dedup: a candidate overlapping an already-kept chunk on the
        // same (document, page) character range loses to the higher score.
        let mut entries: Vec<ScoredChunk> = Vec::with_capacity(top_k.min(candidates.len()));
        for (chunk, score) in candidates {
            if entries.len() == top_k {
                break;
            }
            let overlaps = entries.iter().any(|kept| {
                kept.chunk.document_id == chunk.document_id
                    && kept.chunk.page_number == chunk.page_number
                    && kept.chunk.start < chunk.end
                    && chunk.start < kept.chunk.end
            });
            if overlaps {
                continue;
            }
            let rank = entries.len() + 1;
            entries.push(ScoredChunk { chunk, score, rank });
        }

        debug!(query_len = query.len(), retrieved = entries.len(), "retrieval complete");
        Ok(RetrievalResult { entries })
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embed = self.embedder.embed(query);
        match self.request_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, embed).await.map_err(|_| {
                    RagError::EmbeddingError {
                        provider: "embedder".to_string(),
                        message: format!("query embedding timed out after {limit:?}"),
                    }
                })?
            }
            None => embed.await,
        }
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("overfetch_factor", &self.overfetch_factor)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
