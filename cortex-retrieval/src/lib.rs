//! # cortex-retrieval
//!
//! Two things that sit downstream of a `MemoryStore` read but upstream of
//! the out-of-scope HTTP/tool-framing layer:
//!
//! - [`quality`] — the Quality Scorer: a composite of a model-based and an
//!   implicit-signals score, persisted back into a memory's metadata after
//!   every retrieval.
//! - [`response`] / [`export`] — the response-shaping contracts: the
//!   `results` envelope, `max_response_chars` truncation, `confirm_count`
//!   bulk-delete safety, and export/import envelope normalization.
//!
//! This crate does not reimplement a hybrid FTS5+vector+RRF search surface
//! — that search pipeline is the `MemoryStore::retrieve`/`recall` contract
//! already implemented by `cortex-storage`.

pub mod export;
pub mod quality;
pub mod response;

pub use export::{build_export, normalize_import, ExportEnvelope, ExportSource, NormalizedImport};
pub use quality::QualityScorer;
pub use response::{check_confirm_count, results_from_memories, results_from_scored, shape_response, MemoryResult, ResultsEnvelope, TruncationIndicator};
