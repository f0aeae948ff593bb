//! Answer assembly: prompt construction, generation, citations, confidence.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::document::{Answer, Citation, RetrievalResult};
use crate::error::{RagError, Result};
use crate::generation::Generator;

/// Fixed answer text returned when retrieval produced no grounding passages.
pub const INSUFFICIENT_CONTEXT_ANSWER: &str =
    "The loaded documents do not contain enough information to answer this question.";

/// Assembles retrieved passages into a grounded, cited answer.
///
/// Builds a single prompt that lists each passage tagged with its citation
/// metadata and instructs the generator to answer only from those passages.
/// When retrieval is empty the generator is not called at all: a fixed
/// insufficient-information [`Answer`] with zero citations comes back
/// instead, sparing the external-service call.
pub struct Grounder {
    generator: Arc<dyn Generator>,
    request_timeout: Option<Duration>,
}

impl Grounder {
    /// Create a grounder over the given generator.
    pub fn new(generator: Arc<dyn Generator>, request_timeout: Option<Duration>) -> Self {
        Self { generator, request_timeout }
    }

    /// Map a similarity score to a user-facing confidence value.
    ///
    /// The curve is `score.clamp(0.0, 1.0)`: monotonic, and maximum cosine
    /// similarity (1.0) maps to maximum confidence.
    pub fn confidence(score: f32) -> f32 {
        score.clamp(0.0, 1.0)
    }

    /// Produce a grounded answer for the query from the retrieved passages.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::GenerationError`] if the generator fails or
    /// exceeds the configured deadline.
    pub async fn answer(&self, query: &str, retrieval: &RetrievalResult) -> Result<Answer> {
        if retrieval.is_empty() {
            debug!(query_len = query.len(), "no grounding passages, skipping generator");
            return Ok(Answer {
                text: INSUFFICIENT_CONTEXT_ANSWER.to_string(),
                citations: Vec::new(),
                query: query.to_string(),
                created_at: Utc::now(),
            });
        }

        let prompt = build_prompt(query, retrieval);
        let text = self.generate(&prompt).await?;

        let citations = retrieval
            .entries
            .iter()
            .map(|entry| Citation {
                file_name: entry.chunk.file_name.clone(),
                page_number: entry.chunk.page_number,
                rank: entry.rank,
                confidence: Self::confidence(entry.score),
            })
            .collect();

        Ok(Answer { text, citations, query: query.to_string(), created_at: Utc::now() })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let generate = self.generator.generate(prompt);
        match self.request_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, generate).await.map_err(|_| {
                    RagError::GenerationError {
                        provider: "generator".to_string(),
                        message: format!("generation timed out after {limit:?}"),
                    }
                })?
            }
            None => generate.await,
        }
    }
}

impl std::fmt::Debug for Grounder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grounder").field("request_timeout", &self.request_timeout).finish()
    }
}

/// Build the grounding prompt: numbered passages tagged with file and page,
/// followed by the answering instructions.
fn build_prompt(query: &str, retrieval: &RetrievalResult) -> String {
    let mut context = String::new();
    for entry in &retrieval.entries {
        context.push_str(&format!(
            "[{}] ({}, page {})\n{}\n\n",
            entry.rank, entry.chunk.file_name, entry.chunk.page_number, entry.chunk.text
        ));
    }

    format!(
        "You are DocuMind, an assistant that answers questions using only the supplied document passages.\n\
         Answer concisely from the CONTEXT passages below. Do not add facts that are not present in them.\n\
         If the passages are insufficient to answer, say so explicitly.\n\
         When referencing a source, cite the page number in brackets (e.g. [page 8]).\n\n\
         CONTEXT:\n{context}\
         QUESTION: {query}\n\n\
         Answer clearly and factually."
    )
}
