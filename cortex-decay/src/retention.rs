//! Per-type retention constants (τ in the decay formula, in days).
//!
//! The distilled spec names four retention tiers — critical, reference,
//! standard, temporary — but the data model's `MemoryType` has five
//! variants (`Observation`, `Decision`, `Learning`, `Error`, `Pattern`), not
//! those four names directly. The mapping below is the resolved design
//! decision (see DESIGN.md): decisions are the longest-lived (critical),
//! patterns are consolidated knowledge worth a full season (reference),
//! observations/learnings decay on the standard cadence, and raw errors —
//! unless protected by a tag — are the shortest-lived since most are noise
//! superseded by a later observation or a `pattern` summary.

use cortex_core::memory::MemoryType;

pub const CRITICAL_DAYS: f64 = 365.0;
pub const REFERENCE_DAYS: f64 = 180.0;
pub const STANDARD_DAYS: f64 = 30.0;
pub const TEMPORARY_DAYS: f64 = 7.0;

/// τ(type): the exponential decay time constant, in days.
pub fn base_retention_days(memory_type: MemoryType) -> f64 {
    match memory_type {
        MemoryType::Decision => CRITICAL_DAYS,
        MemoryType::Pattern => REFERENCE_DAYS,
        MemoryType::Observation | MemoryType::Learning => STANDARD_DAYS,
        MemoryType::Error => TEMPORARY_DAYS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_a_positive_retention_window() {
        for t in MemoryType::ALL {
            assert!(base_retention_days(t) > 0.0);
        }
    }

    #[test]
    fn decisions_outlive_errors() {
        assert!(base_retention_days(MemoryType::Decision) > base_retention_days(MemoryType::Error));
    }
}
