//! Nearest-neighbour ranking over the full corpus
//!
//! There is no index: every query rescans every stored vector, which costs
//! O(corpus × vocabulary) per call. An approximate nearest-neighbour index
//! would be a separate component layered on top of the store.

use crate::models::ItemRecord;

/// A corpus entry with its similarity to the query
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<'a> {
    pub record: &'a ItemRecord,
    pub score: f64,
}

/// Cosine similarity of two vectors.
///
/// Zero vectors and vectors of different lengths score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Ranks `corpus` by similarity to `query` and returns up to `k` entries.
///
/// Entries whose id equals `exclude` (the query movie itself) are skipped.
/// Equal scores keep corpus scan order. With `exclude = None` the `k` most
/// similar entries are returned, whatever they are.
pub fn recommend<'a>(
    query: &[f32],
    corpus: &'a [ItemRecord],
    k: usize,
    exclude: Option<i64>,
) -> Vec<Neighbor<'a>> {
    let mut scored: Vec<Neighbor<'a>> = corpus
        .iter()
        .filter(|record| Some(record.tmdb_id) != exclude)
        .map(|record| Neighbor {
            record,
            score: cosine_similarity(query, &record.vector),
        })
        .collect();

    // stable: ties stay in scan order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn record(id: i64, vector: Vec<f32>) -> ItemRecord {
        ItemRecord::new(id, format!("Movie {}", id), vector)
    }

    fn ids(neighbors: &[Neighbor<'_>]) -> Vec<i64> {
        neighbors.iter().map(|n| n.record.tmdb_id).collect()
    }

    #[test]
    fn test_self_similarity_is_one() {
        let v = vec![3.0, 0.0, 4.0, 1.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let a = vec![1.0, 2.0, 0.0, 5.0];
        let b = vec![0.0, 3.0, 1.0, 2.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        assert_eq!(cosine_similarity(&zero, &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_length_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_tie_with_query_excluded() {
        let corpus = vec![
            record(1, vec![1.0, 0.0, 0.0]),
            record(2, vec![1.0, 0.0, 0.0]),
            record(3, vec![0.0, 1.0, 0.0]),
        ];

        let result = recommend(&corpus[0].vector, &corpus, 2, Some(1));
        assert_eq!(ids(&result), vec![2, 3]);
        assert!((result[0].score - 1.0).abs() < EPSILON);
        assert_eq!(result[1].score, 0.0);
    }

    #[test]
    fn test_query_excluded_from_top_five() {
        let corpus: Vec<ItemRecord> = (1..=8)
            .map(|i| record(i, vec![1.0, i as f32, 0.5]))
            .collect();
        let query = corpus[3].clone();

        let result = recommend(&query.vector, &corpus, 5, Some(query.tmdb_id));
        assert_eq!(result.len(), 5);
        assert!(!ids(&result).contains(&query.tmdb_id));
    }

    #[test]
    fn test_absent_query_takes_all_k() {
        let corpus = vec![
            record(1, vec![1.0, 0.0]),
            record(2, vec![0.9, 0.1]),
            record(3, vec![0.0, 1.0]),
        ];

        let result = recommend(&[1.0, 0.0], &corpus, 2, None);
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn test_small_corpus_returns_fewer_than_k() {
        let corpus = vec![record(1, vec![1.0, 0.0]), record(2, vec![0.0, 1.0])];

        let result = recommend(&corpus[0].vector, &corpus, 5, Some(1));
        assert_eq!(ids(&result), vec![2]);
    }

    #[test]
    fn test_equal_scores_keep_scan_order() {
        let corpus = vec![
            record(10, vec![0.0, 1.0]),
            record(11, vec![0.0, 2.0]),
            record(12, vec![0.0, 3.0]),
        ];

        let result = recommend(&[0.0, 1.0], &corpus, 3, None);
        assert_eq!(ids(&result), vec![10, 11, 12]);
    }
}
