//! Flat vector index: cosine similarity via normalized inner product.
//!
//! Deterministic given the inserted embeddings; this brute-force scan is
//! both the "vector index" built after a knowledge build and the graceful
//! path when no ANN library is present.

/// Cosine similarity between two vectors. Zero for mismatched lengths or
/// zero-norm inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64) * (*x as f64);
        norm_b += (*y as f64) * (*y as f64);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Flat index over normalized embeddings keyed by integer ID.
#[derive(Debug, Default)]
pub struct FlatVectorIndex {
    ids: Vec<i64>,
    vectors: Vec<Vec<f32>>,
}

impl FlatVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an embedding. The stored copy is L2-normalized; zero vectors
    /// are stored as-is and never score above zero.
    pub fn insert(&mut self, id: i64, embedding: &[f32]) {
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        let stored = if norm > f32::EPSILON {
            embedding.iter().map(|x| x / norm).collect()
        } else {
            embedding.to_vec()
        };
        self.ids.push(id);
        self.vectors.push(stored);
    }

    /// Top-k IDs by cosine similarity to `query`, descending. Ties break
    /// on ascending ID so results are stable.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(i64, f64)> {
        let mut scored: Vec<(i64, f64)> = self
            .ids
            .iter()
            .zip(&self.vectors)
            .map(|(&id, v)| (id, cosine_similarity(query, v)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_is_one() {
        let v = vec![0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn search_ranks_by_similarity() {
        let mut index = FlatVectorIndex::new();
        index.insert(1, &[1.0, 0.0]);
        index.insert(2, &[0.7, 0.7]);
        index.insert(3, &[0.0, 1.0]);

        let hits = index.search(&[1.0, 0.1], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[1].0, 2);
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn zero_query_scores_zero_everywhere() {
        let mut index = FlatVectorIndex::new();
        index.insert(1, &[1.0, 0.0]);
        let hits = index.search(&[0.0, 0.0], 5);
        assert_eq!(hits[0].1, 0.0);
    }
}
