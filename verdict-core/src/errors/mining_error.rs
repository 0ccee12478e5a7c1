/// Pattern-mining errors.
#[derive(Debug, thiserror::Error)]
pub enum MiningError {
    #[error("cannot mine an empty corpus")]
    EmptyCorpus,

    #[error("mining failed at support level {level}: {reason}")]
    MiningFailed { level: usize, reason: String },
}
