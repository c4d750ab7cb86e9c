//! # cortex-observability
//!
//! The ambient logging/metrics/health layer the rest of the workspace is
//! instrumented against: structured tracing setup, process-wide metrics
//! counters, a health-report aggregator, and embedding-tier degradation
//! tracking.
//!
//! Four modules ([`health`], [`metrics`], [`tracing_setup`],
//! [`degradation`]), each a plain-struct-snapshot over one concern, scaled
//! to the subsystems this system actually has.

pub mod degradation;
pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use degradation::{DegradationTracker, RecoveryStatus, Tier, TrackedDegradation};
pub use health::{build_report, HealthStatus, HorizonStatus, SubsystemHealth, SyncStatus, SystemHealthReport, SystemHealthSnapshot};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use tracing_setup::init_tracing;
