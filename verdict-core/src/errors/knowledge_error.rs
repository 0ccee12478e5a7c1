/// Knowledge-base storage and build errors.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("{what} not found: id {id}")]
    NotFound { what: String, id: i64 },

    #[error("checkpoint operation failed: {reason}")]
    CheckpointFailed { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
