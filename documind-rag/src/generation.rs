//! Generator trait for the external language model.

use async_trait::async_trait;

use crate::error::Result;

/// Turns a grounding prompt into prose.
///
/// The core treats generation as a black box: any failure surfaces as
/// [`RagError::GenerationError`](crate::error::RagError::GenerationError)
/// and is never retried or papered over with a fabricated answer.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate answer text for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
