//! In-memory vector index with exact nearest-neighbor search.

use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::error::{RagError, Result};

/// Similarity metric, fixed at index construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimilarityMetric {
    /// Cosine similarity; scores in `[-1, 1]`, 1.0 for identical directions.
    Cosine,
    /// Raw inner product; appropriate when vectors are pre-normalized.
    DotProduct,
}

impl SimilarityMetric {
    /// Score two vectors of equal dimension.
    fn score(self, a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        match self {
            Self::DotProduct => dot,
            Self::Cosine => {
                let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if norm_a == 0.0 || norm_b == 0.0 {
                    return 0.0;
                }
                dot / (norm_a * norm_b)
            }
        }
    }
}

/// A stored `(Chunk, Embedding)` pair with its insertion id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexEntry {
    /// Monotonically increasing insertion id, the stable handle for an entry.
    pub id: u64,
    /// The indexed chunk.
    pub chunk: Chunk,
    /// The chunk's embedding vector.
    pub embedding: Vec<f32>,
}

/// Append-only in-memory store of chunk embeddings across all loaded documents.
///
/// Dimension and metric are fixed at construction and never change for the
/// lifetime of the instance. Search is an exact scan — O(entries) — which is
/// the reference ranking behavior: descending score, ties broken by lowest
/// insertion id so the earliest-ingested entry wins deterministically.
///
/// The index itself is not synchronized; the engine wraps it in a
/// `tokio::sync::RwLock` for the single-writer/multi-reader discipline.
/// It serializes as `(dimension, metric, ordered entries)` so a snapshot can
/// be reloaded bit-for-bit.
#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    metric: SimilarityMetric,
    entries: Vec<IndexEntry>,
    next_id: u64,
}

impl VectorIndex {
    /// Create an empty index with a fixed dimension and metric.
    pub fn new(dimension: usize, metric: SimilarityMetric) -> Self {
        Self { dimension, metric, entries: Vec::new(), next_id: 0 }
    }

    /// The vector dimension fixed at construction.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The similarity metric fixed at construction.
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append entries, returning their insertion ids.
    ///
    /// Existing entries are never mutated or reordered. All dimensions are
    /// validated before anything lands, so a failed insert leaves the index
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if any embedding disagrees
    /// with the index dimension.
    pub fn insert(&mut self, entries: Vec<(Chunk, Vec<f32>)>) -> Result<Vec<u64>> {
        for (_, embedding) in &entries {
            if embedding.len() != self.dimension {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
        }

        let mut ids = Vec::with_capacity(entries.len());
        for (chunk, embedding) in entries {
            let id = self.next_id;
            self.next_id += 1;
            self.entries.push(IndexEntry { id, chunk, embedding });
            ids.push(id);
        }
        Ok(ids)
    }

    /// Remove every entry belonging to a document. Returns how many were removed.
    pub fn remove(&mut self, document_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.chunk.document_id != document_id);
        before - self.entries.len()
    }

    /// Resolve an entry by insertion id.
    pub fn get(&self, id: u64) -> Option<&IndexEntry> {
        // Entries stay sorted by id: ids are monotonic and inserts append.
        self.entries.binary_search_by_key(&id, |entry| entry.id).ok().map(|i| &self.entries[i])
    }

    /// Return the `k` entries most similar to the query vector as
    /// `(insertion id, score)`, descending by score with ties broken by
    /// lowest insertion id.
    ///
    /// A `k` larger than the entry count returns all entries ranked, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::DimensionMismatch`] if the query vector's
    /// dimension disagrees with the index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f32)>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(u64, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry.id, self.metric.score(&entry.embedding, query)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k.min(self.entries.len()));
        Ok(scored)
    }
}
