//! Embedding providers: remote HTTP, deterministic hashing fallback, and
//! the caching wrapper composed in front of whichever provider is chosen.

mod cache;
mod chunk;
mod hashing;
mod http;

pub use cache::CachedEmbedder;
pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

use tracing::info;
use verdict_core::config::EmbeddingConfig;
use verdict_core::traits::IEmbeddingProvider;

/// Build the configured embedding provider, wrapped in the L1 cache.
///
/// Unknown provider names fall back to the hashing embedder so offline
/// and air-gapped runs always work.
pub fn create_embedding_provider(config: &EmbeddingConfig) -> Box<dyn IEmbeddingProvider> {
    let inner: Box<dyn IEmbeddingProvider> = match config.provider.as_str() {
        "http" => match HttpEmbedder::new(config.clone()) {
            Ok(p) => Box::new(p),
            Err(e) => {
                tracing::warn!(error = %e, "http embedder unavailable, using hashing fallback");
                Box::new(HashingEmbedder::new(config.dimensions))
            }
        },
        _ => Box::new(HashingEmbedder::new(config.dimensions)),
    };

    info!(provider = inner.name(), dims = inner.dimensions(), "embedding provider ready");
    Box::new(CachedEmbedder::new(inner, config.cache_size))
}
