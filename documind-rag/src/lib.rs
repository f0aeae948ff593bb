//! # documind-rag
//!
//! Retrieval-and-grounding engine for document question answering: load
//! documents, ask natural-language questions, and get answers grounded
//! strictly in the documents' content — every answer traceable to the exact
//! source passage, file, and page.
//!
//! ## Overview
//!
//! The engine is a pipeline of small components:
//!
//! - [`PageChunker`] — splits extracted page text into overlapping,
//!   size-bounded passages tagged with their source location
//! - [`EmbeddingProvider`] — maps passages and queries to fixed-length
//!   vectors in a shared semantic space (with optional exact-match caching
//!   via [`CachedEmbedder`])
//! - [`VectorIndex`] — in-memory vector store over all loaded documents,
//!   with deterministic exact nearest-neighbor search
//! - [`Retriever`] — ranked, score-filtered, deduplicated passage retrieval
//! - [`Grounder`] — prompt assembly, generation, and citations with
//!   confidence scores
//!
//! [`RagEngine`] wires them together behind four operations:
//! `ingest_document`, `delete_document`, `query`, and `list_documents`.
//! Text extraction ([`PageExtractor`]) and the language model
//! ([`Generator`]) are external collaborators behind traits; the `gemini`
//! feature provides REST-backed implementations of both.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use documind_rag::{DocumentSource, RagConfig, RagEngine};
//! use documind_rag::gemini::{GeminiEmbedding, GeminiGenerator};
//!
//! let engine = RagEngine::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(GeminiEmbedding::from_env()?))
//!     .generator(Arc::new(GeminiGenerator::from_env()?))
//!     .build()?;
//!
//! let report = engine
//!     .ingest_document(DocumentSource::new("geography.txt", file_bytes))
//!     .await?;
//!
//! let answer = engine.ask("What is the capital of France?").await?;
//! for citation in &answer.citations {
//!     println!("[{}] {} page {} ({:.2})",
//!         citation.rank, citation.file_name, citation.page_number, citation.confidence);
//! }
//! ```
//!
//! ## Concurrency
//!
//! Queries run concurrently under read locks; ingestion and deletion are
//! the only writers and exclude each other as well as in-flight searches.
//! External embedding/generation calls are deadline-bounded and never
//! retried inside the core — retry policy belongs to the caller.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod extract;
#[cfg(feature = "gemini")]
pub mod gemini;
pub mod generation;
pub mod grounder;
pub mod index;
pub mod mock;
pub mod retriever;

pub use chunking::PageChunker;
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{
    Answer, Chunk, Citation, Document, DocumentSource, DocumentSummary, FailedPage, IngestReport,
    Page, RetrievalResult, ScoredChunk,
};
pub use embedding::{CachedEmbedder, EmbeddingProvider};
pub use engine::{RagEngine, RagEngineBuilder};
pub use error::{RagError, Result};
pub use extract::{Extraction, PageExtractor, PlainTextExtractor};
pub use generation::Generator;
pub use grounder::{Grounder, INSUFFICIENT_CONTEXT_ANSWER};
pub use index::{IndexEntry, SimilarityMetric, VectorIndex};
pub use retriever::Retriever;
