use serde::{Deserialize, Serialize};

use super::defaults;

/// Quality-boost configuration (`quality.boost.*`). When disabled, retrieval
/// ranking uses semantic similarity alone and the composite score collapses
/// to the model-only term (`w = 0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub boost_enabled: bool,
    /// Blend weight `w` in `(1-w)*model + w*implicit`, clamped to [0,1].
    pub boost_weight: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            boost_enabled: defaults::DEFAULT_QUALITY_BOOST_ENABLED,
            boost_weight: defaults::DEFAULT_QUALITY_BOOST_WEIGHT,
        }
    }
}

impl QualityConfig {
    /// Effective blend weight: 0 when boosting is disabled regardless of
    /// the configured weight.
    pub fn effective_weight(&self) -> f64 {
        if self.boost_enabled {
            self.boost_weight.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
