/// Storage-layer errors for the embedded SQLite backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite error: {message}")]
    SqliteError { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("database corruption detected: {details}")]
    CorruptionDetected { details: String },

    #[error("connection pool exhausted: {active_connections} active connections")]
    ConnectionPoolExhausted { active_connections: usize },

    #[error("embedding dimension mismatch: store expects {expected}, got {actual}")]
    EmbeddingDimMismatch { expected: usize, actual: usize },
}
