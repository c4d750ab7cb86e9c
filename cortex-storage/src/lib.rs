//! # cortex-storage
//!
//! The local vector store (LVS): an embedded SQLite database holding
//! memories, their embeddings, and the association graph between them.
//! Brute-force cosine similarity scan stands in for a vector index — see
//! [`queries::vector_search`].

pub mod dedup;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;
pub use queries::sync_queue::{OpType as SyncOpType, SyncOpRow};

use cortex_core::errors::{CortexError, StorageError};

/// Fold a `rusqlite`/generic string error into the shared error taxonomy.
pub(crate) fn to_storage_err(message: impl Into<String>) -> CortexError {
    CortexError::Storage(StorageError::SqliteError { message: message.into() })
}
