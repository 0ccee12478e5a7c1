//! OpenAI-compatible chat-completions client.
//!
//! Forces JSON-object responses and wraps every call in the retry policy.
//! A failed call after retries surfaces as a `ProviderError`; callers
//! apply their own degraded fallback (minimal enrichment, error verdict).

use serde::{Deserialize, Serialize};
use tracing::debug;
use verdict_core::config::LlmConfig;
use verdict_core::errors::{ProviderError, VerdictResult};
use verdict_core::traits::ILlmProvider;

use crate::retry::RetryPolicy;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Blocking HTTP LLM provider against an OpenAI-compatible endpoint.
pub struct HttpLlmProvider {
    client: reqwest::blocking::Client,
    config: LlmConfig,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HttpLlmProvider {
    pub fn new(config: LlmConfig) -> VerdictResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::RequestFailed {
                provider: "llm".to_string(),
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

    fn complete_once(&self, system_prompt: &str, user_prompt: &str) -> VerdictResult<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: 0.1,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let mut req = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().map_err(|e| ProviderError::RequestFailed {
            provider: "llm".to_string(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(ProviderError::RequestFailed {
                provider: "llm".to_string(),
                reason: format!("HTTP {}", resp.status()),
            }
            .into());
        }

        let parsed: ChatResponse = resp.json().map_err(|e| ProviderError::InvalidResponse {
            reason: e.to_string(),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                reason: "empty choices array".to_string(),
            })?;

        debug!(model = %self.config.model, bytes = content.len(), "llm completion received");
        Ok(content)
    }
}

impl ILlmProvider for HttpLlmProvider {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> VerdictResult<String> {
        self.retry
            .run("llm.complete", || self.complete_once(system_prompt, user_prompt))
    }

    fn name(&self) -> &str {
        "http-llm"
    }

    fn is_available(&self) -> bool {
        true
    }
}
