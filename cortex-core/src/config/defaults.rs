//! Default values backing every `#[serde(default)]` config struct. Kept in
//! one place so these numbers have a single source of truth.

use crate::constants;

pub const DEFAULT_BACKEND: &str = "local";

pub const DEFAULT_SYNC_BATCH_SIZE: usize = constants::DEFAULT_SYNC_BATCH_SIZE;
pub const DEFAULT_TOMBSTONE_RETENTION_DAYS: i64 = constants::DEFAULT_TOMBSTONE_RETENTION_DAYS;
pub const DEFAULT_SYNC_POLL_INTERVAL_MS: u64 = constants::DEFAULT_SYNC_POLL_INTERVAL_MS;
pub const DEFAULT_SYNC_MAX_ATTEMPTS: i64 = constants::DEFAULT_SYNC_MAX_ATTEMPTS;
pub const DEFAULT_SYNC_BASE_BACKOFF_MS: u64 = constants::DEFAULT_SYNC_BASE_BACKOFF_MS;
pub const DEFAULT_SYNC_MAX_BACKOFF_MS: u64 = constants::DEFAULT_SYNC_MAX_BACKOFF_MS;
pub const DEFAULT_DRIFT_CHECK_INTERVAL_SECS: u64 = constants::DEFAULT_DRIFT_CHECK_INTERVAL_SECS;

pub const DEFAULT_DEDUP_ENABLED: bool = true;
pub const DEFAULT_DEDUP_WINDOW_HOURS: i64 = constants::DEFAULT_DEDUP_WINDOW_HOURS;
pub const DEFAULT_DEDUP_THRESHOLD: f64 = constants::DEFAULT_DEDUP_THRESHOLD;

pub const DEFAULT_QUALITY_BOOST_ENABLED: bool = false;
pub const DEFAULT_QUALITY_BOOST_WEIGHT: f64 = constants::DEFAULT_QUALITY_BOOST_WEIGHT;

pub const DEFAULT_FORGETTING_RELEVANCE_THRESHOLD: f64 =
    constants::DEFAULT_FORGETTING_RELEVANCE_THRESHOLD;
pub const DEFAULT_FORGETTING_ACCESS_THRESHOLD_DAYS: i64 =
    constants::DEFAULT_FORGETTING_ACCESS_THRESHOLD_DAYS;
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = constants::DEFAULT_MIN_CLUSTER_SIZE;
pub const DEFAULT_MAX_ASSOCIATIONS_PER_RUN: usize = constants::DEFAULT_MAX_ASSOCIATIONS_PER_RUN;

pub const DEFAULT_RESPONSE_MAX_CHARS: Option<usize> = None;
