use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::DEFAULT_SUPPORT_LEVELS;

/// Pattern-mining configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Descending minimum-support levels for hierarchical mining.
    pub support_levels: Vec<usize>,
    /// Minimum dominant-label ratio for a distinction pattern.
    pub distinction_threshold: f64,
    pub min_pattern_length: usize,
    pub max_pattern_length: usize,
    /// Stop once this fraction of all sequences is covered.
    pub early_stop_coverage: f64,
    /// Wall-clock budget per support level; an overrun skips lower levels.
    pub max_level_duration_secs: u64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            support_levels: DEFAULT_SUPPORT_LEVELS.to_vec(),
            distinction_threshold: defaults::DEFAULT_DISTINCTION_THRESHOLD,
            min_pattern_length: defaults::DEFAULT_MIN_PATTERN_LENGTH,
            max_pattern_length: defaults::DEFAULT_MAX_PATTERN_LENGTH,
            early_stop_coverage: defaults::DEFAULT_EARLY_STOP_COVERAGE,
            max_level_duration_secs: defaults::DEFAULT_MAX_LEVEL_DURATION_SECS,
        }
    }
}
