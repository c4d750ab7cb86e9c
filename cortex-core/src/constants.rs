/// Cortex system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of historical quality scores retained per memory.
pub const MAX_QUALITY_SCORE_HISTORY: usize = 10;

/// Default window (hours) within which semantic dedup compares `created_at`.
pub const DEFAULT_DEDUP_WINDOW_HOURS: i64 = 24;

/// Default cosine-similarity threshold above which a new memory is rejected
/// as a semantic duplicate.
pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.85;

/// Default tombstone retention window (days) before `purge_tombstones` may
/// remove a row permanently.
pub const DEFAULT_TOMBSTONE_RETENTION_DAYS: i64 = 30;

/// Default batch size for the hybrid sync worker.
pub const DEFAULT_SYNC_BATCH_SIZE: usize = 50;

/// Default delay between hybrid sync worker iterations when the queue is empty.
pub const DEFAULT_SYNC_POLL_INTERVAL_MS: u64 = 2_000;

/// Default attempts before a sync op is parked in the dead-letter state.
pub const DEFAULT_SYNC_MAX_ATTEMPTS: i64 = 5;

/// Base delay for the sync worker's exponential backoff on transient failure.
pub const DEFAULT_SYNC_BASE_BACKOFF_MS: u64 = 500;

/// Ceiling on the sync worker's exponential backoff.
pub const DEFAULT_SYNC_MAX_BACKOFF_MS: u64 = 60_000;

/// Default interval between hybrid drift-detection sweeps.
pub const DEFAULT_DRIFT_CHECK_INTERVAL_SECS: u64 = 3_600;

/// Default number of hashes sampled per drift-detection reconciliation pass.
pub const DEFAULT_DRIFT_SAMPLE_BUCKET_SIZE: usize = 50;

/// Default quality-boost blend weight (implicit signal share).
pub const DEFAULT_QUALITY_BOOST_WEIGHT: f64 = 0.3;

/// Maximum batch size accepted by bulk storage operations.
pub const MAX_BULK_BATCH_SIZE: usize = 1000;

/// "Sweet spot" similarity band used by creative association discovery.
pub const ASSOCIATION_SWEET_SPOT: (f64, f64) = (0.3, 0.7);

/// Default cap on associations discovered per consolidation run.
pub const DEFAULT_MAX_ASSOCIATIONS_PER_RUN: usize = 100;

/// Minimum cluster size for DBSCAN-style semantic clustering.
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 5;

/// Maximum length (characters) of a compressed summary memory.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Default controlled-forgetting relevance threshold.
pub const DEFAULT_FORGETTING_RELEVANCE_THRESHOLD: f64 = 0.1;

/// Default controlled-forgetting access-recency threshold (days).
pub const DEFAULT_FORGETTING_ACCESS_THRESHOLD_DAYS: i64 = 90;

/// Tags that short-circuit decay to maximum relevance.
pub const PROTECTED_TAGS: [&str; 3] = ["critical", "important", "reference"];
