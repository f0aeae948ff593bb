//! Vector index contracts: dimension guard, determinism, tie-breaks, removal.

use documind_rag::document::Chunk;
use documind_rag::error::RagError;
use documind_rag::index::{SimilarityMetric, VectorIndex};
use proptest::prelude::*;

fn chunk(document_id: &str, seq: usize) -> Chunk {
    Chunk {
        document_id: document_id.to_string(),
        file_name: format!("{document_id}.txt"),
        page_number: 1,
        start: seq * 10,
        end: seq * 10 + 10,
        seq,
        text: format!("chunk {seq}"),
    }
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

#[test]
fn mismatched_insert_fails_and_leaves_index_unchanged() {
    let mut index = VectorIndex::new(3, SimilarityMetric::Cosine);

    let entries = vec![
        (chunk("a", 0), vec![1.0, 0.0, 0.0]),
        (chunk("a", 1), vec![1.0, 0.0]), // wrong dimension
    ];
    let err = index.insert(entries).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));

    // No partial insert: the valid first entry did not land either.
    assert_eq!(index.len(), 0);
}

#[test]
fn mismatched_query_dimension_is_an_error() {
    let mut index = VectorIndex::new(3, SimilarityMetric::Cosine);
    index.insert(vec![(chunk("a", 0), vec![1.0, 0.0, 0.0])]).unwrap();

    let err = index.search(&[1.0, 0.0], 1).unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 2 }));
}

#[test]
fn equal_scores_break_ties_by_lowest_insertion_id() {
    let mut index = VectorIndex::new(2, SimilarityMetric::Cosine);
    let ids = index
        .insert(vec![
            (chunk("a", 0), vec![0.0, 1.0]),
            (chunk("a", 1), vec![1.0, 0.0]),
            (chunk("a", 2), vec![1.0, 0.0]),
            (chunk("a", 3), vec![1.0, 0.0]),
        ])
        .unwrap();
    assert_eq!(ids, vec![0, 1, 2, 3]);

    let results = index.search(&[1.0, 0.0], 4).unwrap();
    let result_ids: Vec<u64> = results.iter().map(|(id, _)| *id).collect();
    // Three identical top scores: earliest-ingested wins.
    assert_eq!(result_ids, vec![1, 2, 3, 0]);
}

#[test]
fn oversized_k_returns_all_entries_ranked() {
    let mut index = VectorIndex::new(2, SimilarityMetric::DotProduct);
    index
        .insert(vec![
            (chunk("a", 0), vec![0.2, 0.0]),
            (chunk("a", 1), vec![0.9, 0.0]),
        ])
        .unwrap();

    let results = index.search(&[1.0, 0.0], 100).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, 1);
    assert_eq!(results[1].0, 0);
}

#[test]
fn remove_drops_all_entries_of_a_document() {
    let mut index = VectorIndex::new(2, SimilarityMetric::Cosine);
    index
        .insert(vec![
            (chunk("a", 0), vec![1.0, 0.0]),
            (chunk("b", 0), vec![0.0, 1.0]),
            (chunk("a", 1), vec![0.5, 0.5]),
        ])
        .unwrap();

    assert_eq!(index.remove("a"), 2);
    assert_eq!(index.len(), 1);

    let results = index.search(&[1.0, 0.0], 10).unwrap();
    for (id, _) in results {
        let entry = index.get(id).expect("entry resolvable");
        assert_eq!(entry.chunk.document_id, "b");
    }
}

#[test]
fn insertion_ids_stay_monotonic_across_removals() {
    let mut index = VectorIndex::new(1, SimilarityMetric::DotProduct);
    index.insert(vec![(chunk("a", 0), vec![1.0])]).unwrap();
    index.remove("a");
    let ids = index.insert(vec![(chunk("b", 0), vec![1.0])]).unwrap();
    // Ids are never reused as handles.
    assert_eq!(ids, vec![1]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Inserting the same entries in the same order and searching with the
    /// same query and k always returns the same ranked ids.
    #[test]
    fn search_is_deterministic(
        embeddings in proptest::collection::vec(arb_normalized_embedding(8), 1..20),
        query in arb_normalized_embedding(8),
        k in 1usize..25,
    ) {
        let build = || {
            let mut index = VectorIndex::new(8, SimilarityMetric::Cosine);
            let entries: Vec<_> = embeddings
                .iter()
                .enumerate()
                .map(|(i, e)| (chunk("doc", i), e.clone()))
                .collect();
            index.insert(entries).unwrap();
            index
        };

        let first = build().search(&query, k).unwrap();
        let second = build().search(&query, k).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Results come back in descending score order, bounded by k and by the
    /// number of stored entries.
    #[test]
    fn results_ordered_descending_and_bounded_by_k(
        embeddings in proptest::collection::vec(arb_normalized_embedding(8), 1..20),
        query in arb_normalized_embedding(8),
        k in 1usize..25,
    ) {
        let mut index = VectorIndex::new(8, SimilarityMetric::Cosine);
        let entries: Vec<_> = embeddings
            .iter()
            .enumerate()
            .map(|(i, e)| (chunk("doc", i), e.clone()))
            .collect();
        let count = entries.len();
        index.insert(entries).unwrap();

        let results = index.search(&query, k).unwrap();
        prop_assert!(results.len() <= k);
        prop_assert!(results.len() <= count);

        for window in results.windows(2) {
            prop_assert!(
                window[0].1 >= window[1].1,
                "results not in descending order: {} < {}",
                window[0].1,
                window[1].1,
            );
        }
    }
}
