mod cloud_error;
mod storage_error;

pub use cloud_error::CloudError;
pub use storage_error::StorageError;

/// Top-level error taxonomy for the Cortex memory system.
///
/// Subsystem errors (`StorageError`, `CloudError`) are folded in via `#[from]`
/// so callers at the store boundary can match on one enum, while the
/// subsystem that raised the error keeps its own narrower type for internal
/// matching (e.g. distinguishing transient vs permanent cloud failures).
#[derive(Debug, thiserror::Error)]
pub enum CortexError {
    #[error("duplicate content: hash {hash} already exists")]
    DuplicateExact { hash: String },

    #[error("semantic duplicate of existing memory {existing_hash} (similarity {similarity:.3})")]
    DuplicateSemantic { existing_hash: String, similarity: f64 },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("validation error: {reason}")]
    ValidationError { reason: String },

    #[error("transient backend error: {reason}")]
    TransientBackendError { reason: String },

    #[error("schema error: {reason}")]
    SchemaError { reason: String },

    #[error("fatal configuration error: {reason}")]
    FatalConfigError { reason: String },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

impl CortexError {
    /// Whether this error kind is safe to retry with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            CortexError::TransientBackendError { .. } => true,
            CortexError::Cloud(e) => e.is_transient(),
            CortexError::Storage(StorageError::ConnectionPoolExhausted { .. }) => true,
            _ => false,
        }
    }
}

pub type CortexResult<T> = Result<T, CortexError>;
