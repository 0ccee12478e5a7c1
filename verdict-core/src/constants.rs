/// Verdict system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default descending support levels for hierarchical mining.
pub const DEFAULT_SUPPORT_LEVELS: &[usize] = &[10, 5, 3, 2];

/// Minimum share of covering sequences a biased pattern must reach.
pub const DEFAULT_DISTINCTION_THRESHOLD: f64 = 0.7;

/// Stop mining once this fraction of all sequences is covered.
pub const DEFAULT_EARLY_STOP_COVERAGE: f64 = 0.95;

/// Patterns shorter than this are discarded during mining.
pub const DEFAULT_MIN_PATTERN_LENGTH: usize = 2;

/// Patterns longer than this are discarded during mining.
pub const DEFAULT_MAX_PATTERN_LENGTH: usize = 10;

/// Wall-clock budget per support level (seconds).
pub const DEFAULT_MAX_LEVEL_DURATION_SECS: u64 = 300;

/// Weight of action-sequence similarity in the combined case score.
pub const SEQUENCE_SIMILARITY_WEIGHT: f64 = 0.4;

/// Weight of code-context similarity in the combined case score.
pub const CONTEXT_SIMILARITY_WEIGHT: f64 = 0.6;

/// Number of patterns/cases retrieved for LLM grounding.
pub const DEFAULT_TOP_K: usize = 5;

/// Maximum case code snippets per label embedded in an enrichment prompt.
pub const DEFAULT_MAX_CASE_SAMPLES: usize = 10;

/// Keywords that force a `high` risk level when they appear in matched
/// pattern assessments or retrieved case risk indicators.
pub const HIGH_RISK_KEYWORDS: &[&str] = &[
    "remote_code_execution",
    "credential_theft",
    "ransomware",
    "backdoor",
    "rootkit",
];

/// Confidence weights for the non-deterministic detection branches.
pub const PATTERN_SIMILARITY_WEIGHT: f64 = 0.3;
pub const CASE_SIMILARITY_WEIGHT: f64 = 0.3;
pub const LABEL_CONSISTENCY_WEIGHT: f64 = 0.4;

/// Confidence assigned to deterministic pattern-match verdicts.
pub const DETERMINISTIC_CONFIDENCE: f64 = 0.95;

/// Confidence when both pure-benign and pure-malware patterns match.
pub const CONFLICTING_MATCH_CONFIDENCE: f64 = 0.9;

/// Risk-level confidence thresholds.
pub const HIGH_RISK_CONFIDENCE: f64 = 0.8;
pub const MEDIUM_RISK_CONFIDENCE: f64 = 0.6;
