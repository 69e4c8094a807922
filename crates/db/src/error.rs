//! Store error types

use thiserror::Error;

use crate::id::DocumentId;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Document violates its schema; one message per failed constraint
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("document {0} not found")]
    NotFound(DocumentId),

    #[error("snapshot i/o failed for {path}")]
    Snapshot {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding failed")]
    Encoding(#[from] serde_json::Error),
}
