use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::{CONTEXT_SIMILARITY_WEIGHT, SEQUENCE_SIMILARITY_WEIGHT};

/// Case/pattern retrieval configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of cases/patterns returned per retrieval.
    pub top_k: usize,
    /// Weight of the action-sequence embedding cosine in the combined score.
    pub sequence_weight: f64,
    /// Weight of the code-context embedding cosine in the combined score.
    pub context_weight: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: defaults::DEFAULT_TOP_K,
            sequence_weight: SEQUENCE_SIMILARITY_WEIGHT,
            context_weight: CONTEXT_SIMILARITY_WEIGHT,
        }
    }
}
