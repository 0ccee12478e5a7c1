//! Configuration for every pipeline stage.
//!
//! One explicit struct per subsystem, composed into [`VerdictConfig`].
//! All fields have serde defaults so a partial TOML file is enough.

mod defaults;
mod detection_config;
mod knowledge_config;
mod mining_config;
mod provider_config;
mod retrieval_config;

pub use detection_config::{DetectionConfig, DetectionStrategy};
pub use knowledge_config::KnowledgeConfig;
pub use mining_config::MiningConfig;
pub use provider_config::{EmbeddingConfig, LlmConfig};
pub use retrieval_config::RetrievalConfig;

use serde::{Deserialize, Serialize};

use crate::errors::{VerdictError, VerdictResult};

/// Top-level configuration, passed explicitly into each component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictConfig {
    pub mining: MiningConfig,
    pub knowledge: KnowledgeConfig,
    pub retrieval: RetrievalConfig,
    pub detection: DetectionConfig,
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
}

impl VerdictConfig {
    /// Parse a TOML document; missing sections fall back to defaults.
    pub fn from_toml_str(s: &str) -> VerdictResult<Self> {
        toml::from_str(s).map_err(|e| VerdictError::Config {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let cfg = VerdictConfig::default();
        assert_eq!(cfg.mining.distinction_threshold, 0.7);
        assert_eq!(cfg.mining.early_stop_coverage, 0.95);
        assert_eq!(cfg.retrieval.sequence_weight, 0.4);
        assert_eq!(cfg.retrieval.context_weight, 0.6);
        assert_eq!(cfg.retrieval.top_k, 5);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = VerdictConfig::from_toml_str(
            r#"
            [mining]
            support_levels = [4, 2]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mining.support_levels, vec![4, 2]);
        assert_eq!(cfg.mining.distinction_threshold, 0.7);
        assert_eq!(cfg.knowledge.max_case_samples, 10);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = VerdictConfig::from_toml_str("not = [valid").unwrap_err();
        assert!(matches!(err, VerdictError::Config { .. }));
    }
}
