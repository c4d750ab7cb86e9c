use serde::{Deserialize, Serialize};

/// Pluggable embedding provider selection (`embedding.model`, `embedding.device`).
/// Invalid combinations fall back per the provider's own fallback chain
/// rather than failing at config-parse time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub device: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "local-onnx".to_string(),
            device: "cpu".to_string(),
        }
    }
}
