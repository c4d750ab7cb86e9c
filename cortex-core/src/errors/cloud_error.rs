/// Cloud-backend errors, classified into transient (retry with backoff) and
/// permanent (surface to the caller) per the hybrid backend's retry policy.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    #[error("authentication failed: {reason}")]
    AuthFailed { reason: String },

    #[error("connect error: {reason}")]
    ConnectError { reason: String },

    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("server error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("client error {status}: {message}")]
    ClientError { status: u16, message: String },

    #[error("remote schema refused migration after backoff: {reason}")]
    SchemaRefused { reason: String },

    #[error("quota exceeded: {resource} usage {used}/{limit}")]
    QuotaExceeded { resource: String, used: u64, limit: u64 },
}

impl CloudError {
    /// Transient errors (connect, timeout, 5xx, 429) are retried with
    /// exponential backoff; everything else is permanent.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CloudError::ConnectError { .. }
                | CloudError::Timeout { .. }
                | CloudError::ServerError { .. }
                | CloudError::RateLimited { .. }
        )
    }
}
