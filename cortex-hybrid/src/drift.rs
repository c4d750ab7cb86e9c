//! Periodic drift detection between the local and cloud stores.
//!
//! A healthy hybrid pair keeps its live/tombstone counts within normal sync
//! lag; a persistent gap usually means the worker has been stuck or the
//! cloud side was edited out of band. Detection never blocks the sync
//! worker — it runs on its own interval, samples a bucket of hashes,
//! compares `updated_at` per hash, and reconciles any divergence by pushing
//! the newer side's record to the older store (last-writer-wins).

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use cortex_cloud::CloudStore;
use cortex_core::constants::DEFAULT_DRIFT_SAMPLE_BUCKET_SIZE;
use cortex_core::memory::Memory;
use cortex_core::traits::{MemoryStore, MetadataPatch};
use cortex_storage::StorageEngine;

/// Runs until `shutdown` fires, comparing store counts every
/// `check_interval`.
pub async fn run(
    local: Arc<StorageEngine>,
    cloud: Arc<CloudStore>,
    check_interval: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(check_interval) => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }
        check_once(&local, &cloud).await;
    }
}

/// One drift check. Exposed separately so tests (and a manual
/// health-check invocation) can trigger it without waiting on the timer.
pub async fn check_once(local: &Arc<StorageEngine>, cloud: &Arc<CloudStore>) -> Option<DriftReport> {
    let reports = {
        let local = local.clone();
        let cloud = cloud.clone();
        tokio::task::spawn_blocking(move || (local.health_check(), cloud.health_check())).await.ok()?
    };
    let (local_report, cloud_report) = reports;

    let local_report = match local_report {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "drift check: local health_check failed");
            return None;
        }
    };
    let cloud_report = match cloud_report {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "drift check: cloud health_check failed");
            return None;
        }
    };

    let report = DriftReport {
        local_live: local_report.live_count,
        cloud_live: cloud_report.live_count,
        local_tombstones: local_report.tombstone_count,
        cloud_tombstones: cloud_report.tombstone_count,
    };

    if report.is_drifted() {
        warn!(
            local_live = report.local_live,
            cloud_live = report.cloud_live,
            local_tombstones = report.local_tombstones,
            cloud_tombstones = report.cloud_tombstones,
            "store counts diverged beyond sync lag tolerance"
        );
    } else {
        info!(local_live = report.local_live, cloud_live = report.cloud_live, "drift check: in sync");
    }

    let reconciled = reconcile_bucket(local, cloud, DEFAULT_DRIFT_SAMPLE_BUCKET_SIZE).await;
    if reconciled > 0 {
        info!(reconciled, "drift check: reconciled divergent records by last-writer-wins");
    }

    Some(report)
}

/// Samples up to `bucket_size` live local memories and compares each
/// against its cloud counterpart by `updated_at`. Whichever side is newer
/// wins: its metadata/tags are pushed to the other store via
/// `update_metadata` (or, if the hash is entirely missing on the cloud
/// side, via `store`). Returns the number of hashes reconciled.
async fn reconcile_bucket(local: &Arc<StorageEngine>, cloud: &Arc<CloudStore>, bucket_size: usize) -> usize {
    let sample = {
        let local = local.clone();
        tokio::task::spawn_blocking(move || local.consolidation_candidates(f64::MAX, bucket_size))
            .await
            .ok()
            .and_then(Result::ok)
            .unwrap_or_default()
    };

    let mut reconciled = 0;
    for local_memory in sample {
        let hash = local_memory.content_hash.clone();
        let cloud_memory: Option<Memory> = {
            let cloud = cloud.clone();
            let hash = hash.clone();
            tokio::task::spawn_blocking(move || cloud.get_by_hash(&hash)).await.ok().and_then(Result::ok).flatten()
        };

        match cloud_memory {
            None => {
                // Cloud side is missing this hash entirely; the local
                // record is the newer (only) copy, push it.
                let cloud = cloud.clone();
                let memory = local_memory.clone();
                let _ = tokio::task::spawn_blocking(move || cloud.store(memory)).await;
                reconciled += 1;
            }
            Some(cloud_memory) if local_memory.updated_at > cloud_memory.updated_at => {
                let cloud = cloud.clone();
                let hash_for_op = hash.clone();
                let patch = MetadataPatch::default()
                    .with_metadata(local_memory.metadata.clone())
                    .with_tags(local_memory.tags.clone());
                let _ = tokio::task::spawn_blocking(move || cloud.update_metadata(&hash_for_op, patch)).await;
                debug!(hash = %hash, "drift reconciliation: local is newer, pushed to cloud");
                reconciled += 1;
            }
            Some(cloud_memory) if cloud_memory.updated_at > local_memory.updated_at => {
                let local = local.clone();
                let hash_for_op = hash.clone();
                let patch = MetadataPatch::default()
                    .with_metadata(cloud_memory.metadata.clone())
                    .with_tags(cloud_memory.tags.clone());
                let _ = tokio::task::spawn_blocking(move || local.update_metadata(&hash_for_op, patch)).await;
                debug!(hash = %hash, "drift reconciliation: cloud is newer, pulled to local");
                reconciled += 1;
            }
            Some(_) => {}
        }
    }
    reconciled
}

/// Snapshot comparison of the two stores' counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriftReport {
    pub local_live: usize,
    pub cloud_live: usize,
    pub local_tombstones: usize,
    pub cloud_tombstones: usize,
}

impl DriftReport {
    /// Some lag between "locally written" and "cloud-acknowledged" is
    /// normal and bounded by the sync queue depth; a gap wider than this is
    /// worth a warning rather than routine noise.
    const TOLERANCE: usize = 5;

    pub fn is_drifted(&self) -> bool {
        self.local_live.abs_diff(self.cloud_live) > Self::TOLERANCE
            || self.local_tombstones.abs_diff(self.cloud_tombstones) > Self::TOLERANCE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_gap_is_not_drift() {
        let report = DriftReport { local_live: 100, cloud_live: 98, local_tombstones: 0, cloud_tombstones: 0 };
        assert!(!report.is_drifted());
    }

    #[test]
    fn large_gap_is_drift() {
        let report = DriftReport { local_live: 100, cloud_live: 50, local_tombstones: 0, cloud_tombstones: 0 };
        assert!(report.is_drifted());
    }
}
