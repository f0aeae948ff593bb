//! Page extraction seam between raw file bytes and the ingestion pipeline.

use crate::document::{FailedPage, Page};
use crate::error::{RagError, Result};

/// Pages extracted from one file, plus any pages that failed.
///
/// A single bad page never aborts the document: failed pages are reported
/// so the caller can surface them, while the remaining pages are ingested
/// normally.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Successfully extracted pages, in reading order.
    pub pages: Vec<Page>,
    /// Pages that could not be extracted.
    pub failed_pages: Vec<FailedPage>,
}

/// Turns file bytes into per-page text.
///
/// Format-specific parsing (PDF, HTML, ...) lives behind this trait; the
/// engine only consumes the extracted pages. Empty-text pages are permitted
/// and simply yield zero chunks downstream.
pub trait PageExtractor: Send + Sync {
    /// Extract the pages of a file.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`] only when the whole file is
    /// unreadable; per-page failures go into [`Extraction::failed_pages`].
    fn extract(&self, file_name: &str, data: &[u8]) -> Result<Extraction>;
}

/// Reference extractor for plain UTF-8 text files.
///
/// Form feed (`\x0c`) acts as the page separator, so a file without form
/// feeds is a single page 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PageExtractor for PlainTextExtractor {
    fn extract(&self, file_name: &str, data: &[u8]) -> Result<Extraction> {
        let text = std::str::from_utf8(data).map_err(|e| RagError::ExtractionError {
            file_name: file_name.to_string(),
            message: format!("not valid UTF-8: {e}"),
        })?;

        let pages = text
            .split('\x0c')
            .enumerate()
            .map(|(i, page_text)| Page { page_number: i as u32 + 1, text: page_text.to_string() })
            .collect();

        Ok(Extraction { pages, failed_pages: Vec::new() })
    }
}
