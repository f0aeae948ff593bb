//! Data types for documents, chunks, retrieval results, and answers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single page of extracted document text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    /// 1-based page number, in reading order.
    pub page_number: u32,
    /// Raw text extracted from the page. May be empty.
    pub text: String,
}

/// A loaded document: an ordered sequence of pages plus identity metadata.
///
/// Immutable once ingested; removed on explicit deletion or session end.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Stable document id.
    pub id: String,
    /// Original file name, carried into citations.
    pub file_name: String,
    /// Pages in reading order.
    pub pages: Vec<Page>,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// Raw ingestion input: a named file plus its bytes.
///
/// The id defaults to a fresh UUID. Pin it with [`with_id`](Self::with_id)
/// to make re-uploads idempotent: re-ingesting the same id replaces the
/// previously indexed entries instead of duplicating them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSource {
    /// Document id; a fresh UUID unless pinned by the caller.
    pub id: String,
    /// Original file name.
    pub file_name: String,
    /// Raw file bytes handed to the page extractor.
    pub data: Vec<u8>,
}

impl DocumentSource {
    /// Create a source with a freshly generated UUID id.
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self { id: Uuid::new_v4().to_string(), file_name: file_name.into(), data }
    }

    /// Pin the document id, enabling idempotent re-ingestion.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A bounded contiguous passage of one page's text — the unit of retrieval.
///
/// `start`/`end` are **character** offsets into the page text; chunk
/// boundaries never cross a page boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Id of the parent [`Document`].
    pub document_id: String,
    /// File name of the parent document, denormalized for citations.
    pub file_name: String,
    /// Page the chunk was cut from.
    pub page_number: u32,
    /// Start character offset within the page (inclusive).
    pub start: usize,
    /// End character offset within the page (exclusive).
    pub end: usize,
    /// Chunk sequence index within the document, in emission order.
    pub seq: usize,
    /// The chunk text.
    pub text: String,
}

/// A retrieved [`Chunk`] paired with its similarity score and rank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Similarity score against the query (higher is more relevant).
    pub score: f32,
    /// 1-based rank within the retrieval result.
    pub rank: usize,
}

/// Ordered, deduplicated retrieval output for one query.
///
/// No two entries cover overlapping character ranges of the same
/// document page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    /// Entries ordered by descending score, ranks assigned 1..n.
    pub entries: Vec<ScoredChunk>,
}

impl RetrievalResult {
    /// Number of retrieved entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was retrieved.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A structured reference justifying part of an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    /// File name of the cited document.
    pub file_name: String,
    /// Page the cited passage came from.
    pub page_number: u32,
    /// 1-based rank mirroring the retrieval order.
    pub rank: usize,
    /// Normalized confidence in `[0, 1]`, monotonic in similarity score.
    pub confidence: f32,
}

/// A grounded answer: generated text plus the citations that justify it.
///
/// Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// Citations in retrieval-rank order. Empty when the loaded documents
    /// were insufficient to answer.
    pub citations: Vec<Citation>,
    /// The query this answer responds to.
    pub query: String,
    /// When the answer was produced.
    pub created_at: DateTime<Utc>,
}

/// Summary of a loaded document, as returned by
/// [`RagEngine::list_documents`](crate::engine::RagEngine::list_documents).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSummary {
    /// Document id.
    pub id: String,
    /// Original file name.
    pub file_name: String,
    /// Number of chunks indexed for this document.
    pub num_chunks: usize,
    /// Upload timestamp.
    pub uploaded_at: DateTime<Utc>,
}

/// A page that could not be extracted during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedPage {
    /// 1-based page number of the failed page.
    pub page_number: u32,
    /// Why extraction failed.
    pub reason: String,
}

/// Outcome of ingesting one document.
///
/// Partial page failures do not abort ingestion; they are reported here
/// alongside the document id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestReport {
    /// Id of the ingested document.
    pub document_id: String,
    /// Original file name.
    pub file_name: String,
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
    /// Pages that failed extraction, if any.
    pub failed_pages: Vec<FailedPage>,
}
