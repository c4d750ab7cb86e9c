//! # cortex-hybrid
//!
//! The hybrid backend: local-first reads and writes, backed by a persisted
//! sync queue that a background worker drains to the cloud store, an
//! initial-sync pull for a freshly paired local store, and periodic drift
//! detection between the two.
//!
//! An async, cooperative worker that never sits between a caller and the
//! local store — cloud sync never blocks the request path.

pub mod backend;
pub mod drift;
pub mod initial_sync;
pub mod worker;

pub use backend::HybridBackend;
pub use drift::DriftReport;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use cortex_cloud::CloudStore;
use cortex_core::config::HybridSyncConfig;
use cortex_core::errors::CortexResult;
use cortex_core::traits::MemoryStore;
use cortex_storage::StorageEngine;

/// Owns the background tasks backing a [`HybridBackend`]: the sync worker
/// and the drift watcher. Both are cooperative — [`Self::shutdown`] signals
/// them and waits for the current batch/check to finish; anything still
/// queued when shutdown completes simply stays in `sync_queue` for the
/// next run.
pub struct HybridSupervisor {
    backend: Arc<HybridBackend>,
    shutdown_tx: watch::Sender<bool>,
    worker_handle: JoinHandle<()>,
    drift_handle: JoinHandle<()>,
}

impl HybridSupervisor {
    /// Pairs `local` and `cloud`. If the local store is empty and the cloud
    /// store is not, runs the initial-sync pull before anything else so the
    /// background worker never races a store that still looks freshly
    /// created. Then spawns the sync worker and drift watcher.
    pub async fn connect(
        local: Arc<StorageEngine>,
        cloud: Arc<CloudStore>,
        config: HybridSyncConfig,
    ) -> CortexResult<Self> {
        let local_report = {
            let local = local.clone();
            tokio::task::spawn_blocking(move || local.health_check())
                .await
                .map_err(|e| cortex_core::errors::CortexError::TransientBackendError { reason: e.to_string() })??
        };

        if local_report.live_count == 0 {
            match initial_sync::run(local.clone(), cloud.clone()).await {
                Ok(pulled) if pulled > 0 => info!(pulled, "initial sync pull populated the local store"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "initial sync pull failed, continuing with an empty local store"),
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let backend = Arc::new(HybridBackend::new(local.clone(), cloud.clone(), config.clone()));

        let worker_handle = tokio::spawn(worker::run(local.clone(), cloud.clone(), config.clone(), shutdown_rx.clone()));
        let drift_handle = tokio::spawn(drift::run(
            local,
            cloud,
            Duration::from_secs(config.drift_check_interval_secs),
            shutdown_rx,
        ));

        Ok(Self { backend, shutdown_tx, worker_handle, drift_handle })
    }

    /// The `MemoryStore` handle to use for all reads and writes.
    pub fn backend(&self) -> Arc<HybridBackend> {
        self.backend.clone()
    }

    /// Signals both background tasks to stop and waits for them to finish
    /// their current unit of work.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.worker_handle.await;
        let _ = self.drift_handle.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_cloud::HttpClientConfig;
    use cortex_core::config::DedupConfig;
    use cortex_embeddings::EmbeddingEngine;

    fn local_store() -> Arc<StorageEngine> {
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(16));
        Arc::new(
            StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() })
                .unwrap(),
        )
    }

    fn unreachable_cloud() -> Arc<CloudStore> {
        Arc::new(CloudStore::connect_unchecked(HttpClientConfig {
            base_url: "http://127.0.0.1:0".to_string(),
            timeout: Duration::from_millis(50),
            ..Default::default()
        }))
    }

    #[tokio::test]
    async fn connect_tolerates_an_unreachable_cloud_store() {
        let supervisor = HybridSupervisor::connect(local_store(), unreachable_cloud(), HybridSyncConfig::default())
            .await
            .unwrap();
        let backend = supervisor.backend();
        assert_eq!(backend.health_check().unwrap().live_count, 0);
        supervisor.shutdown().await;
    }
}
