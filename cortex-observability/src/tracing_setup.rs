//! Structured logging setup: an `EnvFilter`-driven `tracing-subscriber`
//! initializer plus a set of span-creation macros, one per major
//! operation, so every crate's instrumentation reads the same way.
//!
//! A `names` module of string constants backs `#[macro_export]` macros
//! for the store/sync/consolidation/embedding stages.

use tracing_subscriber::{fmt, EnvFilter};

/// Span/field name constants, kept as `&str` rather than an enum so
/// `tracing`'s macros (which take string literals) can reference them
/// directly as well.
pub mod names {
    pub const STORE: &str = "cortex.store";
    pub const RETRIEVE: &str = "cortex.retrieve";
    pub const UPDATE: &str = "cortex.update";
    pub const DELETE: &str = "cortex.delete";
    pub const SYNC_PUSH: &str = "cortex.sync.push";
    pub const SYNC_PULL: &str = "cortex.sync.pull";
    pub const CONSOLIDATION_STAGE: &str = "cortex.consolidation.stage";
    pub const EMBEDDING: &str = "cortex.embedding";

    pub const FIELD_CONTENT_HASH: &str = "content_hash";
    pub const FIELD_HORIZON: &str = "horizon";
    pub const FIELD_STAGE: &str = "stage";
    pub const FIELD_BACKEND: &str = "backend";
}

/// Initializes the global `tracing` subscriber from `RUST_LOG`, defaulting
/// to `info` when unset. Call once, at process entry.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

/// Span for a single `store()` call, carrying the content hash once known.
#[macro_export]
macro_rules! store_span {
    ($content_hash:expr) => {
        tracing::info_span!($crate::tracing_setup::names::STORE, content_hash = %$content_hash)
    };
}

/// Span for a `retrieve()`/`recall()` call.
#[macro_export]
macro_rules! retrieve_span {
    ($query:expr) => {
        tracing::info_span!($crate::tracing_setup::names::RETRIEVE, query_len = $query.len())
    };
}

/// Span for the hybrid sync worker pushing a batch to the cloud.
#[macro_export]
macro_rules! sync_push_span {
    ($batch_size:expr) => {
        tracing::info_span!($crate::tracing_setup::names::SYNC_PUSH, batch_size = $batch_size)
    };
}

/// Span for the hybrid sync worker pulling remote changes.
#[macro_export]
macro_rules! sync_pull_span {
    () => {
        tracing::info_span!($crate::tracing_setup::names::SYNC_PULL)
    };
}

/// Span for one consolidation pipeline stage (decay/association/
/// clustering/compression/forgetting) within a given horizon's run.
#[macro_export]
macro_rules! consolidation_stage_span {
    ($horizon:expr, $stage:expr) => {
        tracing::info_span!(
            $crate::tracing_setup::names::CONSOLIDATION_STAGE,
            horizon = $horizon,
            stage = $stage,
        )
    };
}

/// Span for an embedding request, carrying which provider tier served it.
#[macro_export]
macro_rules! embedding_span {
    ($backend:expr) => {
        tracing::info_span!($crate::tracing_setup::names::EMBEDDING, backend = $backend)
    };
}
