//! Engine orchestrating ingestion and grounded question answering.
//!
//! [`RagEngine`] composes a [`PageExtractor`], a [`PageChunker`], an
//! [`EmbeddingProvider`], the shared [`VectorIndex`], a [`Retriever`], and a
//! [`Grounder`] behind the four public operations: ingest, delete, query,
//! and list.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use documind_rag::{DocumentSource, RagConfig, RagEngine};
//!
//! let engine = RagEngine::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(my_embedder))
//!     .generator(Arc::new(my_generator))
//!     .build()?;
//!
//! let report = engine.ingest_document(DocumentSource::new("notes.txt", bytes)).await?;
//! let answer = engine.ask("What is the capital of France?").await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::chunking::PageChunker;
use crate::config::RagConfig;
use crate::document::{
    Answer, Chunk, Document, DocumentSource, DocumentSummary, IngestReport, RetrievalResult,
};
use crate::embedding::{CachedEmbedder, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::extract::{PageExtractor, PlainTextExtractor};
use crate::generation::Generator;
use crate::grounder::Grounder;
use crate::index::{SimilarityMetric, VectorIndex};
use crate::retriever::Retriever;

/// Registry entry for a loaded document.
#[derive(Debug, Clone)]
struct DocumentRecord {
    file_name: String,
    num_chunks: usize,
    uploaded_at: DateTime<Utc>,
}

/// The retrieval-and-grounding engine.
///
/// Owns the in-memory index and document registry for one session. Queries
/// take read locks and run freely in parallel; ingestion and deletion are
/// the only writers and exclude each other as well as in-flight searches,
/// so an upload never produces a torn read during a simultaneous query.
/// External embedding/generation calls happen outside all locks.
///
/// Construct one via [`RagEngine::builder()`].
pub struct RagEngine {
    config: RagConfig,
    chunker: PageChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    extractor: Arc<dyn PageExtractor>,
    retriever: Retriever,
    grounder: Grounder,
    index: Arc<RwLock<VectorIndex>>,
    // Lock order on write paths: `documents` before `index`.
    documents: RwLock<HashMap<String, DocumentRecord>>,
}

impl RagEngine {
    /// Create a new [`RagEngineBuilder`].
    pub fn builder() -> RagEngineBuilder {
        RagEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Ingest a document: extract → chunk → embed → index.
    ///
    /// Idempotent per document id: re-ingesting an id that is already loaded
    /// replaces its index entries instead of duplicating them, so upload
    /// retries are safe. Pages that fail extraction are reported in the
    /// returned [`IngestReport`] without aborting the rest of the document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`] if the whole file is unreadable,
    /// [`RagError::EmbeddingError`] if embedding fails or times out, and
    /// [`RagError::DimensionMismatch`] if the embedder's output disagrees
    /// with the index dimension.
    pub async fn ingest_document(&self, source: DocumentSource) -> Result<IngestReport> {
        let extraction = self.extractor.extract(&source.file_name, &source.data)?;
        if !extraction.failed_pages.is_empty() {
            debug!(
                document_id = %source.id,
                failed_pages = extraction.failed_pages.len(),
                "some pages failed extraction"
            );
        }

        let document = Document {
            id: source.id,
            file_name: source.file_name,
            pages: extraction.pages,
            uploaded_at: Utc::now(),
        };

        let chunks = self.chunker.chunk(&document);
        let embeddings = self.embed_chunks(&document.id, &chunks).await?;

        let expected = self.embedder.dimensions();
        for embedding in &embeddings {
            if embedding.len() != expected {
                return Err(RagError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }

        let entries: Vec<(Chunk, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();
        let chunks_indexed = entries.len();

        let mut documents = self.documents.write().await;
        let mut index = self.index.write().await;
        if documents.contains_key(&document.id) {
            let replaced = index.remove(&document.id);
            debug!(document_id = %document.id, replaced, "replacing previously ingested document");
        }
        index.insert(entries)?;
        documents.insert(
            document.id.clone(),
            DocumentRecord {
                file_name: document.file_name.clone(),
                num_chunks: chunks_indexed,
                uploaded_at: document.uploaded_at,
            },
        );
        drop(index);
        drop(documents);

        info!(document_id = %document.id, chunks_indexed, "ingested document");

        Ok(IngestReport {
            document_id: document.id,
            file_name: document.file_name,
            chunks_indexed,
            failed_pages: extraction.failed_pages,
        })
    }

    /// Ingest multiple documents, stopping at the first failure.
    pub async fn ingest_documents(&self, sources: Vec<DocumentSource>) -> Result<Vec<IngestReport>> {
        let mut reports = Vec::with_capacity(sources.len());
        for source in sources {
            reports.push(self.ingest_document(source).await?);
        }
        Ok(reports)
    }

    /// Delete a document and all of its index entries.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if the id is unknown.
    pub async fn delete_document(&self, document_id: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        let record = documents
            .remove(document_id)
            .ok_or_else(|| RagError::NotFound(document_id.to_string()))?;
        let mut index = self.index.write().await;
        let removed = index.remove(document_id);
        drop(index);
        drop(documents);

        info!(document_id, file_name = %record.file_name, removed, "deleted document");
        Ok(())
    }

    /// Answer a question from the loaded documents with the configured
    /// `top_k` and `min_score` defaults.
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        self.query(query, self.config.top_k, self.config.min_score).await
    }

    /// Answer a question from the loaded documents.
    ///
    /// Retrieves up to `top_k` grounding passages scoring at least
    /// `min_score`, then assembles a cited answer. With no documents loaded
    /// (or nothing above `min_score`) this returns the fixed
    /// insufficient-information answer without calling the generator.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] or [`RagError::GenerationError`]
    /// when the respective external call fails or times out.
    pub async fn query(&self, query: &str, top_k: usize, min_score: f32) -> Result<Answer> {
        let retrieval = self.retriever.retrieve(query, top_k, min_score).await.map_err(|e| {
            error!(error = %e, "retrieval failed");
            e
        })?;
        let answer = self.grounder.answer(query, &retrieval).await.map_err(|e| {
            error!(error = %e, "grounding failed");
            e
        })?;

        info!(query_len = query.len(), citations = answer.citations.len(), "query answered");
        Ok(answer)
    }

    /// Retrieve grounding passages without generating an answer.
    ///
    /// Useful for callers that want the raw ranked passages, or that drive
    /// generation themselves.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<RetrievalResult> {
        self.retriever.retrieve(query, top_k, min_score).await
    }

    /// Summaries of all loaded documents, oldest upload first.
    pub async fn list_documents(&self) -> Vec<DocumentSummary> {
        let documents = self.documents.read().await;
        let mut summaries: Vec<DocumentSummary> = documents
            .iter()
            .map(|(id, record)| DocumentSummary {
                id: id.clone(),
                file_name: record.file_name.clone(),
                num_chunks: record.num_chunks,
                uploaded_at: record.uploaded_at,
            })
            .collect();
        summaries.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    async fn embed_chunks(&self, document_id: &str, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embed = self.embedder.embed_batch(&texts);
        let embeddings = match self.config.request_timeout {
            Some(limit) => tokio::time::timeout(limit, embed).await.map_err(|_| {
                RagError::EmbeddingError {
                    provider: "embedder".to_string(),
                    message: format!(
                        "embedding document '{document_id}' timed out after {limit:?}"
                    ),
                }
            })?,
            None => embed.await,
        }?;

        if embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: "embedder".to_string(),
                message: format!(
                    "batch returned {} embeddings for {} chunks",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }
        Ok(embeddings)
    }
}

impl std::fmt::Debug for RagEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngine").field("config", &self.config).finish()
    }
}

/// Builder for constructing a [`RagEngine`].
///
/// `embedder` and `generator` are required. The extractor defaults to
/// [`PlainTextExtractor`], the metric to cosine similarity, and embeddings
/// are cached by exact text match unless disabled.
///
/// # Example
///
/// ```rust,ignore
/// let engine = RagEngine::builder()
///     .config(RagConfig::builder().chunk_size(400).chunk_overlap(40).build()?)
///     .embedder(Arc::new(embedder))
///     .generator(Arc::new(generator))
///     .extractor(Arc::new(my_pdf_extractor)) // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagEngineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn Generator>>,
    extractor: Option<Arc<dyn PageExtractor>>,
    metric: Option<SimilarityMetric>,
    disable_embedding_cache: bool,
}

impl RagEngineBuilder {
    /// Set the engine configuration. Defaults to [`RagConfig::default()`].
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider (required).
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generator (required).
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the page extractor. Defaults to [`PlainTextExtractor`].
    pub fn extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    /// Set the similarity metric. Defaults to [`SimilarityMetric::Cosine`].
    pub fn metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Disable the exact-match embedding cache.
    pub fn without_embedding_cache(mut self) -> Self {
        self.disable_embedding_cache = true;
        self
    }

    /// Build the [`RagEngine`], validating configuration and wiring the
    /// index to the embedder's dimensionality.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing or
    /// the configuration is inconsistent.
    pub fn build(self) -> Result<RagEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| RagError::ConfigError("generator is required".to_string()))?;
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(PlainTextExtractor));
        let metric = self.metric.unwrap_or(SimilarityMetric::Cosine);

        let embedder: Arc<dyn EmbeddingProvider> = if self.disable_embedding_cache {
            embedder
        } else {
            Arc::new(CachedEmbedder::new(embedder))
        };

        let index = Arc::new(RwLock::new(VectorIndex::new(embedder.dimensions(), metric)));
        let retriever = Retriever::new(
            Arc::clone(&embedder),
            Arc::clone(&index),
            config.overfetch_factor,
            config.request_timeout,
        );
        let grounder = Grounder::new(generator, config.request_timeout);
        let chunker = PageChunker::new(config.chunk_size, config.chunk_overlap);

        Ok(RagEngine {
            config,
            chunker,
            embedder,
            extractor,
            retriever,
            grounder,
            index,
            documents: RwLock::new(HashMap::new()),
        })
    }
}

impl std::fmt::Debug for RagEngineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagEngineBuilder").field("config", &self.config).finish()
    }
}
