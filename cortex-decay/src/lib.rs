//! Exponential relevance decay (consolidation stage 1) and the
//! archival-eligibility check consumed by controlled forgetting (stage 5).

pub mod archival;
pub mod formula;
pub mod retention;

pub use archival::should_archive;
pub use formula::{compute, compute_breakdown, DecayBreakdown};
pub use retention::base_retention_days;
