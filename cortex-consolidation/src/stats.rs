//! Per-run statistics record. Each run updates a statistics record; health
//! monitoring exposes last-run status per horizon.

use serde::{Deserialize, Serialize};

use crate::horizon::Horizon;
use crate::state::RunState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub horizon: Horizon,
    pub state: RunState,
    pub memories_processed: usize,
    pub associations_discovered: usize,
    pub clusters_created: usize,
    pub summaries_emitted: usize,
    pub archived_count: usize,
    pub duration_secs: f64,
}

impl RunStats {
    pub fn starting(horizon: Horizon) -> Self {
        Self {
            horizon,
            state: RunState::Scheduled,
            memories_processed: 0,
            associations_discovered: 0,
            clusters_created: 0,
            summaries_emitted: 0,
            archived_count: 0,
            duration_secs: 0.0,
        }
    }
}
