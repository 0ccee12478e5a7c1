//! HTTP embedding provider against an OpenAI-compatible `/embeddings`
//! endpoint, with chunked handling for texts over the token limit.

use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::config::EmbeddingConfig;
use verdict_core::errors::{ProviderError, VerdictResult};
use verdict_core::traits::IEmbeddingProvider;

use super::chunk;
use crate::retry::RetryPolicy;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Blocking HTTP embedding provider.
pub struct HttpEmbedder {
    client: reqwest::blocking::Client,
    config: EmbeddingConfig,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> VerdictResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed {
                provider: "embedding".to_string(),
                reason: e.to_string(),
            })?;

        let api_key = if config.api_key_env.is_empty() {
            None
        } else {
            std::env::var(&config.api_key_env).ok()
        };

        let retry = RetryPolicy::from_config(config.max_retries, config.backoff_base_secs);

        Ok(Self {
            client,
            config,
            api_key,
            retry,
        })
    }

    fn embed_once(&self, text: &str) -> VerdictResult<Vec<f32>> {
        let url = format!("{}/embeddings", self.config.base_url);
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: text,
        };

        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().map_err(|e| ProviderError::RequestFailed {
            provider: "embedding".to_string(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(ProviderError::RequestFailed {
                provider: "embedding".to_string(),
                reason: format!("HTTP {}", resp.status()),
            }
            .into());
        }

        let parsed: EmbeddingResponse =
            resp.json().map_err(|e| ProviderError::InvalidResponse {
                reason: e.to_string(),
            })?;

        let vec = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::InvalidResponse {
                reason: "empty data array".to_string(),
            })?;

        if vec.len() != self.config.dimensions {
            return Err(ProviderError::InvalidResponse {
                reason: format!(
                    "dimension mismatch: expected {}, got {}",
                    self.config.dimensions,
                    vec.len()
                ),
            }
            .into());
        }

        Ok(vec)
    }
}

impl IEmbeddingProvider for HttpEmbedder {
    fn embed(&self, text: &str) -> VerdictResult<Vec<f32>> {
        let chunks = chunk::split_chunks(text, self.config.chunk_token_limit);
        if chunks.len() == 1 {
            return self.retry.run("embedding.embed", || self.embed_once(text));
        }

        debug!(chunks = chunks.len(), "embedding long text in chunks");
        let mut vectors = Vec::with_capacity(chunks.len());
        for c in &chunks {
            let v = self.retry.run("embedding.embed", || self.embed_once(c))?;
            vectors.push(v);
        }
        Ok(chunk::combine_weighted(&chunks, &vectors))
    }

    fn embed_batch(&self, texts: &[String]) -> VerdictResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "http-embedder"
    }

    fn is_available(&self) -> bool {
        true
    }
}
