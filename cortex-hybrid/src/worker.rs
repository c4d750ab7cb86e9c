//! Background sync worker: drains the persisted queue and pushes each op to
//! the cloud store, retrying transient failures with exponential backoff
//! and parking exhausted ops in the dead-letter state.
//!
//! Batch-then-throttle shape mirrors the embeddings crate's re-embedding
//! worker — drain what's ready, sleep, repeat — generalized from a
//! fixed-interval loop to one driven by cooperative shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use cortex_cloud::transport::protocol::MemoryPayload;
use cortex_cloud::CloudStore;
use cortex_core::config::HybridSyncConfig;
use cortex_core::errors::CortexError;
use cortex_core::memory::Memory;
use cortex_core::traits::MemoryStore;
use cortex_storage::{StorageEngine, SyncOpRow, SyncOpType};

/// Runs until `shutdown` fires. On shutdown it finishes the in-flight batch
/// and returns — whatever is still queued stays persisted in
/// `sync_queue` for the next run.
pub async fn run(local: Arc<StorageEngine>, cloud: Arc<CloudStore>, config: HybridSyncConfig, mut shutdown: tokio::sync::watch::Receiver<bool>) {
    info!(batch_size = config.batch_size, "hybrid sync worker starting");
    loop {
        if *shutdown.borrow() {
            break;
        }

        let batch = {
            let local = local.clone();
            let batch_size = config.batch_size;
            tokio::task::spawn_blocking(move || local.dequeue_sync_batch(batch_size))
                .await
                .unwrap_or_else(|e| Err(CortexError::TransientBackendError { reason: e.to_string() }))
        };

        let batch = match batch {
            Ok(batch) => batch,
            Err(e) => {
                warn!(error = %e, "failed to read sync queue, backing off");
                sleep_or_shutdown(Duration::from_millis(config.base_backoff_ms), &mut shutdown).await;
                continue;
            }
        };

        if batch.is_empty() {
            if wait_for_shutdown_or_interval(Duration::from_millis(config.poll_interval_ms), &mut shutdown).await {
                break;
            }
            continue;
        }

        for op in batch {
            push_one(&local, &cloud, &config, op, &mut shutdown).await;
            if *shutdown.borrow() {
                break;
            }
        }
    }
    info!("hybrid sync worker stopped");
}

async fn push_one(
    local: &Arc<StorageEngine>,
    cloud: &Arc<CloudStore>,
    config: &HybridSyncConfig,
    op: SyncOpRow,
    shutdown: &mut tokio::sync::watch::Receiver<bool>,
) {
    let hash = op.content_hash.clone();
    let prior_attempts = op.attempts.max(0) as u32;
    let cloud = cloud.clone();
    let result = tokio::task::spawn_blocking(move || apply(&cloud, &op))
        .await
        .unwrap_or_else(|e| Err(CortexError::TransientBackendError { reason: e.to_string() }));

    match result {
        Ok(()) => {
            let local = local.clone();
            let hash_for_removal = hash.clone();
            let _ = tokio::task::spawn_blocking(move || local.remove_sync_op(&hash_for_removal)).await;
            debug!(hash = %hash, "synced to cloud");
        }
        Err(e) if e.is_retryable() => {
            let local = local.clone();
            let max_attempts = config.max_attempts;
            let message = e.to_string();
            let hash_for_failure = hash.clone();
            let dead_lettered = tokio::task::spawn_blocking(move || {
                local.record_sync_failure(&hash_for_failure, &message, max_attempts)
            })
            .await
            .unwrap_or(Ok(false))
            .unwrap_or(false);
            if dead_lettered {
                warn!(hash = %hash, error = %e, "sync op parked in dead-letter after exhausting retries");
            } else {
                let delay_ms = config.base_backoff_ms.saturating_mul(1u64 << prior_attempts.min(32)).min(config.max_backoff_ms);
                debug!(hash = %hash, error = %e, delay_ms, "transient sync failure, backing off before retry");
                sleep_or_shutdown(Duration::from_millis(delay_ms), shutdown).await;
            }
        }
        Err(e) => {
            warn!(hash = %hash, error = %e, "permanent sync failure, parking in dead-letter");
            let local = local.clone();
            let hash_for_failure = hash.clone();
            let _ = tokio::task::spawn_blocking(move || {
                local.record_sync_failure(&hash_for_failure, &e.to_string(), 0)
            })
            .await;
        }
    }
}

fn apply(cloud: &CloudStore, op: &SyncOpRow) -> cortex_core::errors::CortexResult<()> {
    match op.op_type {
        SyncOpType::Store | SyncOpType::Update => {
            let payload: MemoryPayload = serde_json::from_str(op.payload.as_deref().unwrap_or("{}"))
                .map_err(|e| CortexError::ValidationError { reason: e.to_string() })?;
            let memory = Memory::from(payload);
            cloud.store(memory).map(|_| ()).or_else(|e| match e {
                // An exact/semantic duplicate on the cloud side means the
                // mutation already landed there; treat it as success.
                CortexError::DuplicateExact { .. } | CortexError::DuplicateSemantic { .. } => Ok(()),
                other => Err(other),
            })
        }
        SyncOpType::Delete => {
            cloud.delete(&op.content_hash).map(|_| ())
        }
    }
}

async fn sleep_or_shutdown(delay: Duration, shutdown: &mut tokio::sync::watch::Receiver<bool>) {
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = shutdown.changed() => {}
    }
}

/// Returns `true` if shutdown fired while waiting.
async fn wait_for_shutdown_or_interval(delay: Duration, shutdown: &mut tokio::sync::watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => false,
        result = shutdown.changed() => result.is_ok() && *shutdown.borrow(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_cloud::HttpClientConfig;

    #[test]
    fn apply_maps_delete_op_to_cloud_delete_call() {
        // Exercises only the op-shape match arm; an unreachable endpoint is
        // expected to surface a transient `ConnectError`, not a panic.
        let cloud = CloudStore::connect_unchecked(HttpClientConfig {
            base_url: "http://127.0.0.1:0".to_string(),
            ..Default::default()
        });
        let op = SyncOpRow {
            content_hash: "h1".to_string(),
            op_type: SyncOpType::Delete,
            payload: None,
            enqueued_at: 1.0,
            attempts: 0,
            last_error: None,
            dead_letter: false,
        };
        let err = apply(&cloud, &op).unwrap_err();
        assert!(err.is_retryable());
    }
}
