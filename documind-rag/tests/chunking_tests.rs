//! Chunking properties: reconstruction, size bounds, overlap, determinism.

use chrono::Utc;
use documind_rag::chunking::PageChunker;
use documind_rag::document::{Chunk, Document, Page};
use proptest::prelude::*;

fn document_from_pages(pages: Vec<String>) -> Document {
    Document {
        id: "doc_1".to_string(),
        file_name: "doc.txt".to_string(),
        pages: pages
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page { page_number: i as u32 + 1, text })
            .collect(),
        uploaded_at: Utc::now(),
    }
}

/// Concatenate the non-overlap core regions of one page's chunks.
///
/// A chunk's core region runs from its start to the next chunk's start;
/// the final chunk contributes its full text.
fn reconstruct(page_chunks: &[&Chunk]) -> String {
    let mut out = String::new();
    for (i, chunk) in page_chunks.iter().enumerate() {
        match page_chunks.get(i + 1) {
            Some(next) => out.extend(chunk.text.chars().take(next.start - chunk.start)),
            None => out.push_str(&chunk.text),
        }
    }
    out
}

fn chunks_for_page<'a>(chunks: &'a [Chunk], page_number: u32) -> Vec<&'a Chunk> {
    chunks.iter().filter(|c| c.page_number == page_number).collect()
}

fn arb_chunk_params() -> impl Strategy<Value = (usize, usize)> {
    (2usize..64).prop_flat_map(|size| (Just(size), 0..size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Concatenating all chunks' core regions reconstructs each page exactly,
    /// no chunk exceeds the size bound, and none is empty.
    #[test]
    fn core_regions_reconstruct_pages(
        pages in proptest::collection::vec("[a-zA-Z0-9À-ÿ .,!?]{0,160}", 0..4),
        (chunk_size, chunk_overlap) in arb_chunk_params(),
    ) {
        let document = document_from_pages(pages);
        let chunker = PageChunker::new(chunk_size, chunk_overlap);
        let chunks = chunker.chunk(&document);

        for chunk in &chunks {
            prop_assert!(!chunk.text.is_empty());
            prop_assert!(chunk.text.chars().count() <= chunk_size);
            prop_assert_eq!(chunk.end - chunk.start, chunk.text.chars().count());
        }

        for page in &document.pages {
            let page_chunks = chunks_for_page(&chunks, page.page_number);
            if page.text.is_empty() {
                prop_assert!(page_chunks.is_empty());
            } else {
                prop_assert_eq!(reconstruct(&page_chunks), page.text.clone());
            }
        }
    }

    /// Consecutive same-page chunks share exactly the configured overlap,
    /// and no chunk is contained in its predecessor.
    #[test]
    fn consecutive_chunks_overlap_exactly(
        text in "[a-z ]{1,300}",
        (chunk_size, chunk_overlap) in arb_chunk_params(),
    ) {
        let document = document_from_pages(vec![text]);
        let chunker = PageChunker::new(chunk_size, chunk_overlap);
        let chunks = chunker.chunk(&document);

        for window in chunks.windows(2) {
            prop_assert_eq!(window[0].end - window[1].start, chunk_overlap);
            prop_assert!(window[1].end > window[0].end);
        }
    }

    /// Same input always yields the same chunk sequence and offsets.
    #[test]
    fn chunking_is_deterministic(
        pages in proptest::collection::vec("[a-z .]{0,120}", 1..3),
        (chunk_size, chunk_overlap) in arb_chunk_params(),
    ) {
        let document = document_from_pages(pages);
        let chunker = PageChunker::new(chunk_size, chunk_overlap);
        prop_assert_eq!(chunker.chunk(&document), chunker.chunk(&document));
    }
}

#[test]
fn multibyte_text_is_split_on_char_boundaries() {
    let document = document_from_pages(vec!["héllo wörld ✓ déjà vu — ünïcode".repeat(4)]);
    let chunker = PageChunker::new(10, 3);
    let chunks = chunker.chunk(&document);

    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 10);
    }
    let page_chunks: Vec<&documind_rag::document::Chunk> = chunks.iter().collect();
    assert_eq!(reconstruct(&page_chunks), document.pages[0].text);
}

#[test]
fn empty_pages_yield_no_chunks() {
    let document =
        document_from_pages(vec![String::new(), "some text".to_string(), String::new()]);
    let chunker = PageChunker::new(50, 10);
    let chunks = chunker.chunk(&document);

    assert!(chunks.iter().all(|c| c.page_number == 2));
    assert_eq!(chunks.len(), 1);
}

#[test]
fn chunks_never_cross_page_boundaries() {
    let document = document_from_pages(vec!["a".repeat(75), "b".repeat(75)]);
    let chunker = PageChunker::new(50, 10);
    let chunks = chunker.chunk(&document);

    for chunk in &chunks {
        let page = &document.pages[(chunk.page_number - 1) as usize];
        assert!(chunk.end <= page.text.chars().count());
        let expected: String = if chunk.page_number == 1 { "a" } else { "b" }.repeat(chunk.text.len());
        assert_eq!(chunk.text, expected);
    }
}

#[test]
fn sequence_indices_follow_emission_order() {
    let document = document_from_pages(vec!["x".repeat(120), "y".repeat(60)]);
    let chunker = PageChunker::new(50, 10);
    let chunks = chunker.chunk(&document);

    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.seq, i);
    }
}
