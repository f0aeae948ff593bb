//! Error types for the `documind-rag` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval-and-grounding engine.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error, fatal at construction time.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An embedding's dimension disagrees with the index's established dimension.
    ///
    /// This indicates a misconfiguration (e.g. mixing embeddings from
    /// different models) and is not recoverable at runtime.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension fixed at index construction.
        expected: usize,
        /// The dimension of the offending vector.
        actual: usize,
    },

    /// The external embedding service failed.
    ///
    /// Surfaced to the caller as a retryable condition; the core never
    /// retries silently.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The external generator failed.
    ///
    /// Surfaced to the caller as a retryable condition; the core never
    /// degrades a failed generation into a fabricated answer.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generator that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Text extraction failed for an entire document.
    ///
    /// Per-page failures do not produce this error; they are reported in
    /// the [`IngestReport`](crate::document::IngestReport) instead.
    #[error("Extraction error for '{file_name}': {message}")]
    ExtractionError {
        /// The file that could not be extracted.
        file_name: String,
        /// A description of the failure.
        message: String,
    },

    /// An operation referenced an unknown document id.
    #[error("Document not found: {0}")]
    NotFound(String),
}

/// A convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, RagError>;
