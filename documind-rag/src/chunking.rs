//! Splitting extracted page text into overlapping, size-bounded chunks.

use crate::document::{Chunk, Document};

/// Splits each page of a document into fixed-size character windows with
/// configurable overlap.
///
/// Windows never cross a page boundary. Consecutive windows within a page
/// share exactly `chunk_overlap` characters. The final window of a page may
/// be shorter than `chunk_size`; a window fully contained in the previous
/// one is never emitted. Empty pages yield zero chunks.
///
/// Chunking is deterministic: the same document always yields the same
/// chunk sequence and offsets.
///
/// The caller must guarantee `chunk_overlap < chunk_size`;
/// [`RagConfig`](crate::config::RagConfig) validation enforces this.
#[derive(Debug, Clone)]
pub struct PageChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl PageChunker {
    /// Create a new `PageChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug_assert!(chunk_overlap < chunk_size);
        Self { chunk_size, chunk_overlap }
    }

    /// Split a document into chunks. Offsets are character offsets into the
    /// page text; slicing is UTF-8 safe.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        // Guards against a zero-length advance even if the overlap
        // precondition was bypassed.
        let stride = self.chunk_size.saturating_sub(self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut seq = 0;

        for page in &document.pages {
            // Byte offset of every character, so windows land on char boundaries.
            let boundaries: Vec<usize> = page.text.char_indices().map(|(i, _)| i).collect();
            let char_count = boundaries.len();
            if char_count == 0 {
                continue;
            }

            let mut start = 0;
            loop {
                let end = (start + self.chunk_size).min(char_count);
                let byte_start = boundaries[start];
                let byte_end = if end == char_count { page.text.len() } else { boundaries[end] };

                chunks.push(Chunk {
                    document_id: document.id.clone(),
                    file_name: document.file_name.clone(),
                    page_number: page.page_number,
                    start,
                    end,
                    seq,
                    text: page.text[byte_start..byte_end].to_string(),
                });
                seq += 1;

                if end == char_count {
                    break;
                }
                start += stride;
            }
        }

        chunks
    }
}
