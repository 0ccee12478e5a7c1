//! Deterministic hashing embedder.
//!
//! Buckets terms into a fixed-dimension vector by FNV-1a hash, weighted by
//! term frequency and a length-based rarity proxy, then L2-normalized.
//! No network dependency, so offline builds and tests always have a
//! working provider.

use std::collections::HashMap;

use verdict_core::errors::VerdictResult;
use verdict_core::traits::IEmbeddingProvider;

/// Offline fallback embedding provider.
///
/// Not semantically rich, but deterministic: identical text always maps to
/// the identical vector, which is what the idempotent-build and retrieval
/// tests rely on.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn bucket(term: &str, dims: usize) -> usize {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        (h as usize) % dims
    }

    fn terms(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect()
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let terms = Self::terms(text);
        if terms.is_empty() {
            return vec![0.0; self.dimensions];
        }

        let mut counts: HashMap<&str, f32> = HashMap::new();
        for t in &terms {
            *counts.entry(t.as_str()).or_default() += 1.0;
        }

        let total = terms.len() as f32;
        let mut vec = vec![0.0f32; self.dimensions];
        for (term, count) in &counts {
            let tf = count / total;
            // Longer identifiers are rarer; length stands in for IDF.
            let rarity = 1.0 + (term.len() as f32).ln();
            vec[Self::bucket(term, self.dimensions)] += tf * rarity;
        }

        super::chunk::normalize(&mut vec);
        vec
    }
}

impl IEmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> VerdictResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> VerdictResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let e = HashingEmbedder::new(128);
        let a = e.embed("read_env_var http_post").unwrap();
        let b = e.embed("read_env_var http_post").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn correct_dimensions() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.embed("anything").unwrap().len(), 64);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashingEmbedder::new(32);
        let v = e.embed("").unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn nonempty_vector_is_unit_length() {
        let e = HashingEmbedder::new(128);
        let v = e.embed("exec_shell download_file write_startup").unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn different_texts_differ() {
        let e = HashingEmbedder::new(128);
        let a = e.embed("read_file").unwrap();
        let b = e.embed("delete_file").unwrap();
        assert_ne!(a, b);
    }
}
