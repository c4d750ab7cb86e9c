use serde::{Deserialize, Serialize};

use super::defaults;

/// Semantic-deduplication configuration (`dedup.semantic.*`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub semantic_enabled: bool,
    pub semantic_window_hours: i64,
    pub semantic_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            semantic_enabled: defaults::DEFAULT_DEDUP_ENABLED,
            semantic_window_hours: defaults::DEFAULT_DEDUP_WINDOW_HOURS,
            semantic_threshold: defaults::DEFAULT_DEDUP_THRESHOLD,
        }
    }
}
