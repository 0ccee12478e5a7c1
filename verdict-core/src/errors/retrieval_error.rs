/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("knowledge base missing at {path}")]
    KnowledgeBaseMissing { path: String },

    #[error("search failed: {reason}")]
    SearchFailed { reason: String },
}
