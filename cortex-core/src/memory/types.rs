use serde::{Deserialize, Serialize};

/// The 5 base memory types. Unknown types coerce to `Observation` rather
/// than failing — classification is a soft signal, not a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Observation,
    Decision,
    Learning,
    Error,
    Pattern,
}

impl MemoryType {
    pub const ALL: [MemoryType; 5] = [
        MemoryType::Observation,
        MemoryType::Decision,
        MemoryType::Learning,
        MemoryType::Error,
        MemoryType::Pattern,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemoryType::Observation => "observation",
            MemoryType::Decision => "decision",
            MemoryType::Learning => "learning",
            MemoryType::Error => "error",
            MemoryType::Pattern => "pattern",
        }
    }
}

impl Default for MemoryType {
    fn default() -> Self {
        MemoryType::Observation
    }
}

impl std::fmt::Display for MemoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
