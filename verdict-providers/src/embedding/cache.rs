//! L1 in-memory embedding cache keyed by content hash.

use moka::sync::Cache;
use verdict_core::errors::VerdictResult;
use verdict_core::traits::IEmbeddingProvider;

/// Caching wrapper around any embedding provider.
///
/// Keys are blake3 hashes of the input text, so cache hits are exact
/// content matches regardless of where the text came from.
pub struct CachedEmbedder {
    inner: Box<dyn IEmbeddingProvider>,
    cache: Cache<String, Vec<f32>>,
}

impl CachedEmbedder {
    pub fn new(inner: Box<dyn IEmbeddingProvider>, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }

    fn key(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }
}

impl IEmbeddingProvider for CachedEmbedder {
    fn embed(&self, text: &str) -> VerdictResult<Vec<f32>> {
        let key = Self::key(text);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit);
        }
        let vec = self.inner.embed(text)?;
        self.cache.insert(key, vec.clone());
        Ok(vec)
    }

    fn embed_batch(&self, texts: &[String]) -> VerdictResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
