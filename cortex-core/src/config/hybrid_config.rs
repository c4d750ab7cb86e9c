use serde::{Deserialize, Serialize};

use super::defaults;

/// Hybrid-backend sync configuration (`hybrid.sync.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridSyncConfig {
    /// Max ops drained per worker iteration.
    pub batch_size: usize,
    /// Tombstones older than this (days) are purged in both stores.
    pub tombstone_retention_days: i64,
    /// Delay between drain iterations once the queue runs dry.
    pub poll_interval_ms: u64,
    /// Attempts before an op is parked in the dead-letter state.
    pub max_attempts: i64,
    /// Base delay for exponential backoff on a transient push failure.
    pub base_backoff_ms: u64,
    /// Ceiling on the backoff delay, regardless of attempt count.
    pub max_backoff_ms: u64,
    /// Interval between periodic local/cloud drift-detection sweeps.
    pub drift_check_interval_secs: u64,
}

impl Default for HybridSyncConfig {
    fn default() -> Self {
        Self {
            batch_size: defaults::DEFAULT_SYNC_BATCH_SIZE,
            tombstone_retention_days: defaults::DEFAULT_TOMBSTONE_RETENTION_DAYS,
            poll_interval_ms: defaults::DEFAULT_SYNC_POLL_INTERVAL_MS,
            max_attempts: defaults::DEFAULT_SYNC_MAX_ATTEMPTS,
            base_backoff_ms: defaults::DEFAULT_SYNC_BASE_BACKOFF_MS,
            max_backoff_ms: defaults::DEFAULT_SYNC_MAX_BACKOFF_MS,
            drift_check_interval_secs: defaults::DEFAULT_DRIFT_CHECK_INTERVAL_SECS,
        }
    }
}
