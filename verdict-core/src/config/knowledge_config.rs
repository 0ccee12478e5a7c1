use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Knowledge-base build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// SQLite database path for the persisted knowledge base.
    pub db_path: PathBuf,
    /// Maximum case snippets per label included in an enrichment prompt.
    pub max_case_samples: usize,
    /// Whether to run best-effort LLM summaries per case.
    pub enrich_cases: bool,
    /// Rayon worker threads for the build; 0 means rayon's default.
    pub worker_threads: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(defaults::DEFAULT_KNOWLEDGE_DB),
            max_case_samples: defaults::DEFAULT_MAX_CASE_SAMPLES,
            enrich_cases: true,
            worker_threads: defaults::DEFAULT_WORKER_THREADS,
        }
    }
}
