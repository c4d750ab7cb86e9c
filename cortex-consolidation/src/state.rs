//! Per-run state machine: `Idle → Scheduled → Running{stage} →
//! (Success | Failed | Paused)`. A failed run in stage `k` does not undo
//! completed stages — partial results are valid.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Decay,
    Association,
    Clustering,
    Compression,
    Forgetting,
}

impl Stage {
    pub const ORDER: [Stage; 5] =
        [Stage::Decay, Stage::Association, Stage::Clustering, Stage::Compression, Stage::Forgetting];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Scheduled,
    Running { stage: Stage },
    Success,
    Failed { stage: Stage, reason: String },
    Paused { resume_at: Stage },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Success | RunState::Failed { .. })
    }
}
