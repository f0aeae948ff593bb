//! Deterministic test doubles for the embedding and generation seams.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::generation::Generator;

/// Deterministic bag-of-words embedder.
///
/// Each lowercase alphanumeric word is hashed (FNV-1a) into one of
/// `dimensions` buckets; the counted vector is L2-normalized. Texts sharing
/// vocabulary score high under cosine similarity, which makes term-overlap
/// assertions in tests straightforward. No external service involved.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder with the given output dimension.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

fn fnv1a(word: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in word.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
        {
            let bucket = (fnv1a(&word) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Generator that returns a canned reply and records its invocations.
///
/// Tests use [`call_count`](Self::call_count) to assert the grounder
/// short-circuit and [`last_prompt`](Self::last_prompt) to inspect the
/// prompt that was built.
#[derive(Debug, Default)]
pub struct StaticGenerator {
    reply: String,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl StaticGenerator {
    /// Create a generator that always replies with `reply`.
    pub fn new(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), calls: AtomicUsize::new(0), last_prompt: Mutex::new(None) }
    }

    /// How many times `generate` was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent prompt passed to `generate`, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl Generator for StaticGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_prompt.lock() {
            *guard = Some(prompt.to_string());
        }
        Ok(self.reply.clone())
    }
}
