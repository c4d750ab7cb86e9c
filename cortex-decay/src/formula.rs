//! Exponential decay formula (consolidation stage 1):
//!
//! ```text
//! relevance = base_retention(type) × exp(-age / τ(type)) × (1 + f(access_count) + g(connection_count))
//! ```
//!
//! clamped to `[0.0, 1.0]`. Memories tagged with a protected tag
//! (`cortex_core::constants::PROTECTED_TAGS`) short-circuit to `1.0` —
//! they never decay regardless of age or usage.

use cortex_core::constants::PROTECTED_TAGS;
use cortex_core::memory::Memory;

use crate::retention::base_retention_days;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Base relevance before the exponential decay term is applied. Kept at
/// `1.0` for every type — the per-type distinction is carried entirely by
/// τ (`base_retention_days`), not by a separate starting ceiling.
const BASE_RELEVANCE: f64 = 1.0;

pub(crate) fn is_protected(memory: &Memory) -> bool {
    memory.tags.iter().any(|t| PROTECTED_TAGS.iter().any(|p| p.eq_ignore_ascii_case(t)))
}

/// Usage boost `f(access_count)`: diminishing-returns log curve so a
/// handful of accesses meaningfully slow decay without a single
/// frequently-read memory dominating the composite.
fn access_boost(access_count: u64) -> f64 {
    (access_count as f64).ln_1p() / 10.0
}

/// Connectivity boost `g(connection_count)`: same shape as the access
/// boost — a memory wired into the association graph is less likely to be
/// noise.
fn connection_boost(connection_count: usize) -> f64 {
    (connection_count as f64).ln_1p() / 10.0
}

/// Compute decayed relevance for `memory` as of `now` (epoch seconds).
/// `connection_count` is the number of graph edges touching this memory —
/// callers pass it in since decay itself has no storage access.
pub fn compute(memory: &Memory, now: f64, connection_count: usize) -> f64 {
    compute_breakdown(memory, now, connection_count).relevance
}

#[derive(Debug, Clone, Copy)]
pub struct DecayBreakdown {
    pub protected: bool,
    pub age_days: f64,
    pub tau_days: f64,
    pub temporal_decay: f64,
    pub access_boost: f64,
    pub connection_boost: f64,
    pub relevance: f64,
}

/// Compute decay with a full breakdown of each term, for observability.
pub fn compute_breakdown(memory: &Memory, now: f64, connection_count: usize) -> DecayBreakdown {
    if is_protected(memory) {
        return DecayBreakdown {
            protected: true,
            age_days: 0.0,
            tau_days: 0.0,
            temporal_decay: 1.0,
            access_boost: 0.0,
            connection_boost: 0.0,
            relevance: 1.0,
        };
    }

    let age_days = ((now - memory.created_at).max(0.0)) / SECONDS_PER_DAY;
    let tau = base_retention_days(memory.memory_type);
    let temporal_decay = (-age_days / tau).exp();
    let access = access_boost(memory.metadata.access_count());
    let connection = connection_boost(connection_count);

    let relevance = (BASE_RELEVANCE * temporal_decay * (1.0 + access + connection)).clamp(0.0, 1.0);

    DecayBreakdown {
        protected: false,
        age_days,
        tau_days: tau,
        temporal_decay,
        access_boost: access,
        connection_boost: connection,
        relevance,
    }
}

#[cfg(test)]
mod tests {
    use cortex_core::memory::{Metadata, MemoryType};

    use super::*;

    fn memory_aged_days(age_days: f64, memory_type: MemoryType, tags: &[&str]) -> Memory {
        let now = 1_000_000.0;
        let created_at = now - age_days * SECONDS_PER_DAY;
        Memory::new(
            "some content",
            tags.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            memory_type,
            Metadata::new(),
            created_at,
            vec![0.1, 0.2],
        )
    }

    #[test]
    fn fresh_memory_decays_little() {
        let m = memory_aged_days(0.0, MemoryType::Observation, &[]);
        let relevance = compute(&m, 1_000_000.0, 0);
        assert!(relevance > 0.95, "fresh memory should be near full relevance, got {relevance}");
    }

    #[test]
    fn old_standard_memory_decays_substantially() {
        let m = memory_aged_days(120.0, MemoryType::Observation, &[]);
        let relevance = compute(&m, 1_000_000.0, 0);
        assert!(relevance < 0.2, "120-day-old standard memory should have decayed heavily, got {relevance}");
    }

    #[test]
    fn decision_outlasts_error_at_same_age() {
        let decision = memory_aged_days(60.0, MemoryType::Decision, &[]);
        let error = memory_aged_days(60.0, MemoryType::Error, &[]);
        let now = 1_000_000.0;
        assert!(compute(&decision, now, 0) > compute(&error, now, 0));
    }

    #[test]
    fn protected_tag_short_circuits_to_max_relevance() {
        let m = memory_aged_days(900.0, MemoryType::Error, &["critical"]);
        assert_eq!(compute(&m, 1_000_000.0, 0), 1.0);
    }

    #[test]
    fn relevance_is_clamped_to_unit_interval() {
        let mut m = memory_aged_days(0.0, MemoryType::Decision, &[]);
        m.metadata.set_access_count(10_000);
        let relevance = compute(&m, 1_000_000.0, 10_000);
        assert!((0.0..=1.0).contains(&relevance));
    }

    #[test]
    fn higher_access_count_slows_decay() {
        let mut low = memory_aged_days(60.0, MemoryType::Observation, &[]);
        let mut high = low.clone();
        low.metadata.set_access_count(0);
        high.metadata.set_access_count(50);
        let now = 1_000_000.0;
        assert!(compute(&high, now, 0) > compute(&low, now, 0));
    }
}
