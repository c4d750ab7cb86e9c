//! Stage 1: exponential decay.
//!
//! Scores every horizon candidate's current relevance. Purely a read —
//! nothing is persisted here. The breakdown is carried forward so stage 5
//! (controlled forgetting) doesn't have to recompute it.

use cortex_core::errors::CortexResult;
use cortex_core::memory::Memory;
use cortex_decay::DecayBreakdown;
use cortex_storage::StorageEngine;

/// A candidate alongside its decayed relevance.
#[derive(Debug, Clone)]
pub struct Decayed {
    pub memory: Memory,
    pub breakdown: DecayBreakdown,
}

/// Score every candidate against `now`, pulling each one's connection
/// count from storage for the formula's `g(connection_count)` term.
pub fn run(storage: &StorageEngine, candidates: Vec<Memory>, now: f64) -> CortexResult<Vec<Decayed>> {
    candidates
        .into_iter()
        .map(|memory| {
            let connections = storage.connection_count(&memory.content_hash)?;
            let breakdown = cortex_decay::compute_breakdown(&memory, now, connections);
            Ok(Decayed { memory, breakdown })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::config::DedupConfig;
    use cortex_core::memory::{MemoryType, Metadata};
    use cortex_core::traits::MemoryStore;
    use cortex_embeddings::EmbeddingEngine;
    use std::sync::Arc;

    fn engine() -> StorageEngine {
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(8));
        StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() }).unwrap()
    }

    #[test]
    fn scores_every_candidate() {
        let engine = engine();
        let m = Memory::new("an old note about rust", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        engine.store(m.clone()).unwrap();
        let decayed = run(&engine, vec![m], 1_000_000.0).unwrap();
        assert_eq!(decayed.len(), 1);
        assert!(decayed[0].breakdown.relevance < 1.0);
        assert!(!decayed[0].breakdown.protected);
    }

    #[test]
    fn connection_count_feeds_the_formula() {
        let engine = engine();
        let m = Memory::new("protected note", "critical", MemoryType::Error, Metadata::new(), 1.0, vec![]);
        engine.store(m.clone()).unwrap();
        let decayed = run(&engine, vec![m], 1_000_000_000.0).unwrap();
        assert_eq!(decayed[0].breakdown.relevance, 1.0, "protected tag should short-circuit decay");
    }
}
