//! # cortex-consolidation
//!
//! The dream-inspired consolidation pipeline: five stages run per time
//! horizon — decay, creative association, semantic clustering, semantic
//! compression, and controlled forgetting.
//!
//! A recall-gate-style accept/reject step is folded into
//! `min_cluster_size` at the clustering stage rather than run as its own
//! stage.

pub mod archive;
pub mod association;
pub mod clustering;
pub mod compression;
pub mod decay;
pub mod forgetting;
pub mod horizon;
pub mod state;
pub mod stats;

pub use horizon::Horizon;
pub use state::{RunState, Stage};
pub use stats::RunStats;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use cortex_core::config::ConsolidationConfig;
use cortex_core::constants::MAX_BULK_BATCH_SIZE;
use cortex_core::errors::{CortexError, CortexResult};
use cortex_storage::StorageEngine;

fn now() -> f64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

/// Owns the single-run guard and per-horizon run history for one storage
/// instance.
///
/// Transitions are serialized: no two runs may overlap on the same storage
/// instance. [`Self::run`] takes a non-blocking lock and
/// fails fast rather than queuing a caller behind a long-running pipeline.
/// A failed stage does not undo completed stages — [`RunStats`] records
/// exactly how far the run got before the failure.
pub struct Consolidator {
    storage: Arc<StorageEngine>,
    config: ConsolidationConfig,
    running: Mutex<()>,
    last_run: Mutex<HashMap<Horizon, RunStats>>,
}

impl Consolidator {
    pub fn new(storage: Arc<StorageEngine>, config: ConsolidationConfig) -> Self {
        Self { storage, config, running: Mutex::new(()), last_run: Mutex::new(HashMap::new()) }
    }

    /// Last recorded run statistics for `horizon`, for health monitoring's
    /// last-run status per horizon. A poisoned history lock degrades to
    /// "no recorded run" rather than panicking.
    pub fn last_run(&self, horizon: Horizon) -> Option<RunStats> {
        self.last_run.lock().ok()?.get(&horizon).cloned()
    }

    /// Run the five-stage pipeline for one horizon.
    pub fn run(&self, horizon: Horizon) -> CortexResult<RunStats> {
        let _guard = self.running.try_lock().map_err(|_| CortexError::ValidationError {
            reason: "a consolidation run is already in progress on this store".to_string(),
        })?;

        let stats = self.run_inner(horizon);
        self.last_run
            .lock()
            .map_err(|_| CortexError::TransientBackendError {
                reason: "consolidation run history lock poisoned".to_string(),
            })?
            .insert(horizon, stats.clone());
        Ok(stats)
    }

    /// Runs every stage in order, recording how far it got. Never returns
    /// `Err` itself — a stage failure is recorded in the returned
    /// `RunStats` so the caller's next scheduled tick can proceed to the
    /// next horizon regardless.
    fn run_inner(&self, horizon: Horizon) -> RunStats {
        let started = now();
        let mut stats = RunStats::starting(horizon);

        let cutoff = started - horizon.threshold_days() * 86_400.0;
        let candidates = match self.storage.consolidation_candidates(cutoff, MAX_BULK_BATCH_SIZE) {
            Ok(c) => c,
            Err(e) => return failed(stats, Stage::Decay, e, started),
        };
        stats.memories_processed = candidates.len();
        info!(horizon = %horizon, count = candidates.len(), "consolidation run selected candidates");

        if candidates.is_empty() {
            stats.state = RunState::Success;
            stats.duration_secs = now() - started;
            return stats;
        }

        // Stage 1: decay.
        stats.state = RunState::Running { stage: Stage::Decay };
        let decayed = match decay::run(&self.storage, candidates, started) {
            Ok(d) => d,
            Err(e) => return failed(stats, Stage::Decay, e, started),
        };
        let live: Vec<_> = decayed.iter().map(|d| d.memory.clone()).collect();

        // Stage 2: creative association.
        stats.state = RunState::Running { stage: Stage::Association };
        match association::run(&self.storage, &live, self.config.max_associations_per_run) {
            Ok(n) => stats.associations_discovered = n,
            Err(e) => return failed(stats, Stage::Association, e, started),
        }

        // Stage 3: semantic clustering.
        stats.state = RunState::Running { stage: Stage::Clustering };
        let clusters = clustering::run(&live, self.config.min_cluster_size);
        stats.clusters_created = clusters.len();

        // Stage 4: semantic compression.
        stats.state = RunState::Running { stage: Stage::Compression };
        match compression::run(&self.storage, &live, &clusters, started) {
            Ok(summaries) => stats.summaries_emitted = summaries.len(),
            Err(e) => return failed(stats, Stage::Compression, e, started),
        }

        // Stage 5: controlled forgetting.
        stats.state = RunState::Running { stage: Stage::Forgetting };
        match forgetting::run(
            &self.storage,
            &self.config.archive_path,
            &decayed,
            started,
            self.config.forgetting.relevance_threshold,
            self.config.forgetting.access_threshold_days as f64,
        ) {
            Ok(n) => stats.archived_count = n,
            Err(e) => return failed(stats, Stage::Forgetting, e, started),
        }

        stats.state = RunState::Success;
        stats.duration_secs = now() - started;
        if let Err(e) = archive::write_run_stats(&self.config.archive_path, &stats, started) {
            warn!(error = %e, "failed to persist consolidation run statistics");
        }
        stats
    }
}

fn failed(mut stats: RunStats, stage: Stage, error: CortexError, started: f64) -> RunStats {
    warn!(stage = ?stage, error = %error, "consolidation stage failed");
    stats.state = RunState::Failed { stage, reason: error.to_string() };
    stats.duration_secs = now() - started;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::config::DedupConfig;
    use cortex_core::memory::{Memory, MemoryType, Metadata};
    use cortex_core::traits::MemoryStore;
    use cortex_embeddings::EmbeddingEngine;

    fn consolidator() -> (Consolidator, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(8));
        let storage = Arc::new(
            StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() })
                .unwrap(),
        );
        let config = ConsolidationConfig { archive_path: dir.path().to_path_buf(), ..Default::default() };
        (Consolidator::new(storage, config), dir)
    }

    #[test]
    fn empty_store_succeeds_with_nothing_processed() {
        let (consolidator, _dir) = consolidator();
        let stats = consolidator.run(Horizon::Daily).unwrap();
        assert_eq!(stats.state, RunState::Success);
        assert_eq!(stats.memories_processed, 0);
    }

    #[test]
    fn run_processes_eligible_candidates_and_records_stats() {
        let (consolidator, _dir) = consolidator();
        let old_created_at = now() - 400.0 * 86_400.0;
        for i in 0..3 {
            let m = Memory::new(
                format!("an old memory about rust number {i}"),
                "rust",
                MemoryType::Observation,
                Metadata::new(),
                old_created_at,
                vec![],
            );
            consolidator.storage.store(m).unwrap();
        }

        let stats = consolidator.run(Horizon::Daily).unwrap();
        assert_eq!(stats.state, RunState::Success);
        assert_eq!(stats.memories_processed, 3);
        assert_eq!(consolidator.last_run(Horizon::Daily).unwrap().state, RunState::Success);
    }

    #[test]
    fn concurrent_run_is_rejected() {
        let (consolidator, _dir) = consolidator();
        let _guard = consolidator.running.try_lock().unwrap();
        let result = consolidator.run(Horizon::Daily);
        assert!(result.is_err());
    }
}
