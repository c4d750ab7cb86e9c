//! Aggregate health reporting: folds a store's `MemoryStore::health_check()`,
//! the hybrid sync worker's queue state (if running hybrid), and the
//! consolidator's per-horizon run status into one [`SystemHealthReport`].
//!
//! A plain snapshot struct in, a derived overall status plus per-subsystem
//! breakdown out. Kept decoupled from `cortex-hybrid`/`cortex-consolidation`
//! — callers convert their own `SyncOpRow`/`RunStats` into the small local
//! [`SyncStatus`]/[`HorizonStatus`] shapes, so this crate doesn't pull in
//! every backend crate just to report on them.

use serde::{Deserialize, Serialize};

use cortex_core::traits::HealthReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsystemHealth {
    pub name: String,
    pub status: HealthStatus,
    pub message: Option<String>,
}

/// Background sync worker state, for hybrid-backend deployments. `None` in
/// the snapshot means the store isn't running in hybrid mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    pub queue_depth: usize,
    pub dead_letter_count: usize,
}

/// Last consolidation run status for one horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonStatus {
    pub horizon: String,
    /// `"success"`, `"failed"`, `"running"`, or `"never_run"`.
    pub state: String,
    pub last_run_duration_secs: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SystemHealthSnapshot {
    pub store: Option<HealthReport>,
    pub sync: Option<SyncStatus>,
    pub consolidation: Vec<HorizonStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealthReport {
    pub overall_status: HealthStatus,
    pub subsystems: Vec<SubsystemHealth>,
}

/// Storage: unhealthy if the store reports not writable, degraded past a
/// 10x tombstone-to-live ratio (retention window likely misconfigured —
/// purge_tombstones isn't running).
fn check_storage(store: &Option<HealthReport>) -> SubsystemHealth {
    let Some(report) = store else {
        return SubsystemHealth { name: "storage".to_string(), status: HealthStatus::Unhealthy, message: Some("no store health report available".to_string()) };
    };
    if !report.writable {
        return SubsystemHealth {
            name: "storage".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some("store is not writable".to_string()),
        };
    }
    let (status, message) = if report.live_count > 0 && report.tombstone_count > report.live_count * 10 {
        (HealthStatus::Degraded, Some("tombstone count far exceeds live count; purge_tombstones may not be running".to_string()))
    } else {
        (HealthStatus::Healthy, None)
    };
    SubsystemHealth { name: "storage".to_string(), status, message }
}

/// Sync worker: degraded once any op is parked in the dead-letter table,
/// unhealthy once the queue backs up past a gross multiple of the default
/// batch size (worker has likely stalled).
fn check_sync(sync: &Option<SyncStatus>) -> Option<SubsystemHealth> {
    let sync = sync.as_ref()?;
    let (status, message) = if sync.queue_depth > 10 * cortex_core::constants::DEFAULT_SYNC_BATCH_SIZE {
        (HealthStatus::Unhealthy, Some(format!("sync queue depth {} suggests the worker has stalled", sync.queue_depth)))
    } else if sync.dead_letter_count > 0 {
        (HealthStatus::Degraded, Some(format!("{} sync operations parked in dead-letter", sync.dead_letter_count)))
    } else {
        (HealthStatus::Healthy, None)
    };
    Some(SubsystemHealth { name: "sync_worker".to_string(), status, message })
}

/// Consolidation: degraded if any horizon's most recent run failed.
fn check_consolidation(horizons: &[HorizonStatus]) -> Option<SubsystemHealth> {
    if horizons.is_empty() {
        return None;
    }
    let failed: Vec<&str> = horizons.iter().filter(|h| h.state == "failed").map(|h| h.horizon.as_str()).collect();
    let (status, message) = if failed.is_empty() {
        (HealthStatus::Healthy, None)
    } else {
        (HealthStatus::Degraded, Some(format!("consolidation failed on last run for: {}", failed.join(", "))))
    };
    Some(SubsystemHealth { name: "consolidation".to_string(), status, message })
}

fn derive_overall(subsystems: &[SubsystemHealth]) -> HealthStatus {
    let mut worst = HealthStatus::Healthy;
    for s in subsystems {
        match s.status {
            HealthStatus::Unhealthy => return HealthStatus::Unhealthy,
            HealthStatus::Degraded => worst = HealthStatus::Degraded,
            HealthStatus::Healthy => {}
        }
    }
    worst
}

pub fn build_report(snapshot: &SystemHealthSnapshot) -> SystemHealthReport {
    let mut subsystems = vec![check_storage(&snapshot.store)];
    if let Some(sync) = check_sync(&snapshot.sync) {
        subsystems.push(sync);
    }
    if let Some(consolidation) = check_consolidation(&snapshot.consolidation) {
        subsystems.push(consolidation);
    }
    let overall_status = derive_overall(&subsystems);
    SystemHealthReport { overall_status, subsystems }
}
