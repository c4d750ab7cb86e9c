use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Cron-style schedule per consolidation horizon. `None` means manual-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationSchedule {
    pub daily: Option<String>,
    pub weekly: Option<String>,
    pub monthly: Option<String>,
    pub quarterly: Option<String>,
    pub yearly: Option<String>,
}

/// Controlled-forgetting thresholds (`consolidation.forgetting.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgettingConfig {
    pub relevance_threshold: f64,
    pub access_threshold_days: i64,
}

impl Default for ForgettingConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: defaults::DEFAULT_FORGETTING_RELEVANCE_THRESHOLD,
            access_threshold_days: defaults::DEFAULT_FORGETTING_ACCESS_THRESHOLD_DAYS,
        }
    }
}

/// Consolidation pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub schedule: ConsolidationSchedule,
    pub forgetting: ForgettingConfig,
    /// Minimum cluster size for semantic clustering (DBSCAN-style).
    pub min_cluster_size: usize,
    /// Cap on associations discovered per consolidation run.
    pub max_associations_per_run: usize,
    /// Filesystem directory for archive JSON (`daily/`, `compressed/`, `metadata/`).
    pub archive_path: PathBuf,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            schedule: ConsolidationSchedule::default(),
            forgetting: ForgettingConfig::default(),
            min_cluster_size: defaults::DEFAULT_MIN_CLUSTER_SIZE,
            max_associations_per_run: defaults::DEFAULT_MAX_ASSOCIATIONS_PER_RUN,
            archive_path: PathBuf::from("./cortex-archive"),
        }
    }
}
