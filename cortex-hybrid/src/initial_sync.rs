//! One-shot pull of the remote store into a freshly paired local store.
//!
//! Run once, before the sync worker starts, when a local store with no
//! prior sync history is paired with a cloud store that already holds
//! memories (e.g. the same account opened on a new machine). A hash that is
//! locally tombstoned is never resurrected by the pull — a deliberate local
//! delete always outranks a stale remote copy.

use std::sync::Arc;

use tracing::{info, warn};

use cortex_cloud::CloudStore;
use cortex_core::errors::CortexResult;
use cortex_core::traits::MemoryStore;
use cortex_storage::StorageEngine;

/// Pulls every live remote memory not already present (or tombstoned)
/// locally. Returns the number of memories pulled in.
pub async fn run(local: Arc<StorageEngine>, cloud: Arc<CloudStore>) -> CortexResult<usize> {
    let remote = {
        let cloud = cloud.clone();
        tokio::task::spawn_blocking(move || cloud.export_live()).await.map_err(|e| {
            cortex_core::errors::CortexError::TransientBackendError { reason: e.to_string() }
        })??
    };

    if remote.is_empty() {
        return Ok(0);
    }

    info!(candidates = remote.len(), "running initial sync pull from cloud");
    let mut pulled = 0;
    for memory in remote {
        let local = local.clone();
        let hash = memory.content_hash.clone();
        let already_present = {
            let local = local.clone();
            let hash = hash.clone();
            tokio::task::spawn_blocking(move || local.get_by_hash(&hash))
                .await
                .map_err(|e| cortex_core::errors::CortexError::TransientBackendError { reason: e.to_string() })??
                .is_some()
        };
        if already_present {
            continue;
        }

        let tombstoned = {
            let local = local.clone();
            let hash = hash.clone();
            tokio::task::spawn_blocking(move || local.is_tombstoned(&hash))
                .await
                .map_err(|e| cortex_core::errors::CortexError::TransientBackendError { reason: e.to_string() })??
        };
        if tombstoned {
            // A deliberate local delete outranks a stale remote copy.
            continue;
        }

        let stored = tokio::task::spawn_blocking(move || local.store(memory)).await.map_err(|e| {
            cortex_core::errors::CortexError::TransientBackendError { reason: e.to_string() }
        })?;
        match stored {
            Ok(_) => pulled += 1,
            Err(cortex_core::errors::CortexError::DuplicateExact { .. }) => {}
            Err(e) => warn!(hash = %hash, error = %e, "initial sync pull failed for one memory"),
        }
    }
    info!(pulled, "initial sync pull complete");
    Ok(pulled)
}
