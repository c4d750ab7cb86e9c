mod consolidation_config;
mod dedup_config;
mod embedding_config;
mod hybrid_config;
mod quality_config;

pub mod defaults;

pub use consolidation_config::{ConsolidationConfig, ConsolidationSchedule, ForgettingConfig};
pub use dedup_config::DedupConfig;
pub use embedding_config::EmbeddingConfig;
pub use hybrid_config::HybridSyncConfig;
pub use quality_config::QualityConfig;

use serde::{Deserialize, Serialize};

/// Which concrete store backs the `MemoryStore` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Cloud,
    Hybrid,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::Local
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = crate::errors::CortexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "cloud" => Ok(StorageBackend::Cloud),
            "hybrid" => Ok(StorageBackend::Hybrid),
            other => Err(crate::errors::CortexError::ValidationError {
                reason: format!("unknown storage backend: {other}"),
            }),
        }
    }
}

/// The full recognized configuration surface (§6).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    pub backend: StorageBackend,
    pub hybrid: HybridSyncConfig,
    pub dedup: DedupConfig,
    pub quality: QualityConfig,
    pub consolidation: ConsolidationConfig,
    pub embedding: EmbeddingConfig,
    /// Applied when callers do not pass `max_response_chars` explicitly.
    pub response_max_chars: Option<usize>,
}
