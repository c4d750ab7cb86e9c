//! Process-wide counters, collected behind `dashmap` so every subsystem can
//! bump them from its own thread/task without a shared `Mutex` around the
//! whole registry.
//!
//! A struct of named sub-collectors rather than one flat counter map:
//! `StorageMetrics` / `SyncMetrics` / `ConsolidationMetrics` /
//! `EmbeddingMetrics` under one [`MetricsRegistry`].

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

#[derive(Debug, Default)]
struct Counter(AtomicU64);

impl Counter {
    fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    fn incr_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct StorageMetrics {
    stores: Counter,
    retrieves: Counter,
    updates: Counter,
    deletes: Counter,
    exact_dedup_rejections: Counter,
    semantic_dedup_rejections: Counter,
    tombstone_resurrections: Counter,
}

impl StorageMetrics {
    pub fn record_store(&self) {
        self.stores.incr();
    }

    pub fn record_retrieve(&self) {
        self.retrieves.incr();
    }

    pub fn record_update(&self) {
        self.updates.incr();
    }

    pub fn record_delete(&self) {
        self.deletes.incr();
    }

    pub fn record_exact_dedup_rejection(&self) {
        self.exact_dedup_rejections.incr();
    }

    pub fn record_semantic_dedup_rejection(&self) {
        self.semantic_dedup_rejections.incr();
    }

    pub fn record_tombstone_resurrection(&self) {
        self.tombstone_resurrections.incr();
    }

    pub fn snapshot(&self) -> StorageMetricsSnapshot {
        StorageMetricsSnapshot {
            stores: self.stores.get(),
            retrieves: self.retrieves.get(),
            updates: self.updates.get(),
            deletes: self.deletes.get(),
            exact_dedup_rejections: self.exact_dedup_rejections.get(),
            semantic_dedup_rejections: self.semantic_dedup_rejections.get(),
            tombstone_resurrections: self.tombstone_resurrections.get(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageMetricsSnapshot {
    pub stores: u64,
    pub retrieves: u64,
    pub updates: u64,
    pub deletes: u64,
    pub exact_dedup_rejections: u64,
    pub semantic_dedup_rejections: u64,
    pub tombstone_resurrections: u64,
}

#[derive(Debug, Default)]
pub struct SyncMetrics {
    enqueued: Counter,
    pushed: Counter,
    pulled: Counter,
    conflicts_resolved: Counter,
    dead_lettered: Counter,
}

impl SyncMetrics {
    pub fn record_enqueue(&self) {
        self.enqueued.incr();
    }

    pub fn record_push_batch(&self, n: u64) {
        self.pushed.incr_by(n);
    }

    pub fn record_pull_batch(&self, n: u64) {
        self.pulled.incr_by(n);
    }

    pub fn record_conflict_resolved(&self) {
        self.conflicts_resolved.incr();
    }

    pub fn record_dead_letter(&self) {
        self.dead_lettered.incr();
    }

    pub fn snapshot(&self) -> SyncMetricsSnapshot {
        SyncMetricsSnapshot {
            enqueued: self.enqueued.get(),
            pushed: self.pushed.get(),
            pulled: self.pulled.get(),
            conflicts_resolved: self.conflicts_resolved.get(),
            dead_lettered: self.dead_lettered.get(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncMetricsSnapshot {
    pub enqueued: u64,
    pub pushed: u64,
    pub pulled: u64,
    pub conflicts_resolved: u64,
    pub dead_lettered: u64,
}

/// Keyed by horizon name (`"session"`, `"daily"`, `"weekly"`, `"monthly"`)
/// since each horizon runs and fails independently.
#[derive(Debug, Default)]
pub struct ConsolidationMetrics {
    runs: DashMap<String, u64>,
    failures: DashMap<String, u64>,
    memories_processed: DashMap<String, u64>,
}

impl ConsolidationMetrics {
    pub fn record_run(&self, horizon: &str, memories_processed: u64) {
        *self.runs.entry(horizon.to_string()).or_insert(0) += 1;
        *self.memories_processed.entry(horizon.to_string()).or_insert(0) += memories_processed;
    }

    pub fn record_failure(&self, horizon: &str) {
        *self.failures.entry(horizon.to_string()).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> Vec<ConsolidationHorizonSnapshot> {
        self.runs
            .iter()
            .map(|entry| {
                let horizon = entry.key().clone();
                ConsolidationHorizonSnapshot {
                    horizon: horizon.clone(),
                    runs: *entry.value(),
                    failures: self.failures.get(&horizon).map(|v| *v).unwrap_or(0),
                    memories_processed: self.memories_processed.get(&horizon).map(|v| *v).unwrap_or(0),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationHorizonSnapshot {
    pub horizon: String,
    pub runs: u64,
    pub failures: u64,
    pub memories_processed: u64,
}

#[derive(Debug, Default)]
pub struct EmbeddingMetrics {
    primary_hits: Counter,
    cloud_fallback_hits: Counter,
    hash_fallback_hits: Counter,
    cache_hits: Counter,
    cache_misses: Counter,
}

impl EmbeddingMetrics {
    pub fn record_tier(&self, tier: &str) {
        match tier {
            "primary" => self.primary_hits.incr(),
            "cloud_fallback" => self.cloud_fallback_hits.incr(),
            _ => self.hash_fallback_hits.incr(),
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.incr();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.incr();
    }

    pub fn snapshot(&self) -> EmbeddingMetricsSnapshot {
        EmbeddingMetricsSnapshot {
            primary_hits: self.primary_hits.get(),
            cloud_fallback_hits: self.cloud_fallback_hits.get(),
            hash_fallback_hits: self.hash_fallback_hits.get(),
            cache_hits: self.cache_hits.get(),
            cache_misses: self.cache_misses.get(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingMetricsSnapshot {
    pub primary_hits: u64,
    pub cloud_fallback_hits: u64,
    pub hash_fallback_hits: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Top-level registry. Intended to be constructed once per process and
/// shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    pub storage: StorageMetrics,
    pub sync: SyncMetrics,
    pub consolidation: ConsolidationMetrics,
    pub embedding: EmbeddingMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub storage: StorageMetricsSnapshot,
    pub sync: SyncMetricsSnapshot,
    pub consolidation: Vec<ConsolidationHorizonSnapshot>,
    pub embedding: EmbeddingMetricsSnapshot,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            storage: self.storage.snapshot(),
            sync: self.sync.snapshot(),
            consolidation: self.consolidation.snapshot(),
            embedding: self.embedding.snapshot(),
        }
    }
}
