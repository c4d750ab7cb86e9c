//! Shared builders for the memories, graph edges and seeded stores that
//! every crate's test suite otherwise re-invents. Kept deliberately small:
//! one helper per recurring test setup, not a generic fixture DSL.

use std::sync::Arc;

use cortex_core::config::DedupConfig;
use cortex_core::memory::{GraphEdge, Memory, MemoryType, Metadata, RelationshipType};
use cortex_embeddings::EmbeddingEngine;
use cortex_storage::StorageEngine;

/// A live memory with the given content and tag, created at `created_at`.
pub fn memory_at(content: &str, tag: &str, created_at: f64) -> Memory {
    Memory::new(content, tag, MemoryType::Observation, Metadata::new(), created_at, vec![])
}

/// A live memory with a specific type, for tests that care about
/// type-dependent behavior (decay retention tiers, ontology coercion, ...).
pub fn memory_typed(content: &str, memory_type: MemoryType, created_at: f64) -> Memory {
    Memory::new(content, Vec::<String>::new(), memory_type, Metadata::new(), created_at, vec![])
}

/// A memory tagged with one of the protected tags (`critical`, `important`,
/// `reference`), for decay/forgetting tests that need short-circuited
/// retention.
pub fn protected_memory(content: &str, created_at: f64) -> Memory {
    Memory::new(content, "critical", MemoryType::Observation, Metadata::new(), created_at, vec![])
}

/// A symmetric-or-asymmetric graph edge between two hashes, for
/// relationship-ops and consolidation-association tests.
pub fn edge(source: &str, target: &str, relationship_type: RelationshipType, similarity: f64) -> GraphEdge {
    GraphEdge {
        source_hash: source.to_string(),
        target_hash: target.to_string(),
        relationship_type,
        similarity,
        metadata: Default::default(),
    }
}

/// An in-memory `StorageEngine` with the hash-fallback embedding provider
/// (deterministic, no model weights to load) and semantic dedup disabled
/// by default — most callers want plain insert/read behavior, not to
/// accidentally collide on near-duplicate fixture content.
pub fn seeded_engine(dim: usize) -> StorageEngine {
    let embeddings = Arc::new(EmbeddingEngine::fallback_only(dim));
    StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() }).unwrap()
}

/// Same as [`seeded_engine`], but with semantic dedup enabled at the given
/// threshold/window — for dedup-specific test suites.
pub fn seeded_engine_with_dedup(dim: usize, dedup_config: DedupConfig) -> StorageEngine {
    let embeddings = Arc::new(EmbeddingEngine::fallback_only(dim));
    StorageEngine::open_in_memory(embeddings, dedup_config).unwrap()
}

/// Current wall-clock time as float epoch seconds, matching every engine's
/// internal `now()` helper. Tests that need "recent" vs "old" timestamps
/// relative to the present use this rather than hardcoding an epoch.
pub fn now() -> f64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

/// `n` distinct live memories about the same loose topic, spaced `spacing_days`
/// apart ending at `now`, for consolidation/clustering tests that need a
/// small coherent corpus rather than one-off unrelated memories.
pub fn topic_cluster(topic: &str, n: usize, spacing_days: f64, anchor: f64) -> Vec<Memory> {
    (0..n)
        .map(|i| {
            let created_at = anchor - (n - 1 - i) as f64 * spacing_days * 86_400.0;
            memory_at(&format!("{topic} observation number {i}"), topic, created_at)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::traits::MemoryStore;

    #[test]
    fn seeded_engine_stores_and_reads_back() {
        let engine = seeded_engine(8);
        let m = memory_at("fixture smoke test", "fixtures", now());
        let hash = engine.store(m).unwrap();
        assert!(engine.get_by_hash(&hash).unwrap().is_some());
    }

    #[test]
    fn topic_cluster_spans_the_requested_window() {
        let anchor = 1_000_000.0;
        let cluster = topic_cluster("rust", 5, 10.0, anchor);
        assert_eq!(cluster.len(), 5);
        assert_eq!(cluster.last().unwrap().created_at, anchor);
        assert_eq!(cluster.first().unwrap().created_at, anchor - 40.0 * 86_400.0);
    }
}
