//! Stage 5: controlled forgetting.
//!
//! A decayed memory is archived — written to disk as append-only JSON,
//! then tombstoned — only when it's simultaneously low-relevance, stale by
//! access recency, and unprotected.

use cortex_core::errors::CortexResult;
use cortex_core::traits::MemoryStore;
use cortex_storage::StorageEngine;

use crate::archive;
use crate::decay::Decayed;

/// Archive every candidate that clears the forgetting bar. Returns the
/// number archived.
pub fn run(
    storage: &StorageEngine,
    archive_path: &std::path::Path,
    decayed: &[Decayed],
    now: f64,
    relevance_threshold: f64,
    access_threshold_days: f64,
) -> CortexResult<usize> {
    let mut archived = 0;
    for d in decayed {
        if !cortex_decay::should_archive(&d.memory, d.breakdown.relevance, now, relevance_threshold, access_threshold_days) {
            continue;
        }
        archive::write_daily(archive_path, &d.memory, now)?;
        storage.delete(&d.memory.content_hash)?;
        archived += 1;
    }
    Ok(archived)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::config::DedupConfig;
    use cortex_core::memory::{Memory, MemoryType, Metadata};
    use cortex_decay::compute_breakdown;
    use cortex_embeddings::EmbeddingEngine;
    use std::sync::Arc;

    fn engine() -> StorageEngine {
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(4));
        StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() }).unwrap()
    }

    fn decayed_at(engine: &StorageEngine, content: &str, tags: &str, created_at: f64, now: f64) -> Decayed {
        let memory = Memory::new(content, tags, MemoryType::Observation, Metadata::new(), created_at, vec![]);
        engine.store(memory.clone()).unwrap();
        let breakdown = compute_breakdown(&memory, now, 0);
        Decayed { memory, breakdown }
    }

    #[test]
    fn low_relevance_stale_memory_is_archived_and_tombstoned() {
        let engine = engine();
        let now = 200.0 * 86_400.0;
        let d = decayed_at(&engine, "ancient note", "t", 0.0, now);
        let hash = d.memory.content_hash.clone();
        let dir = tempfile::tempdir().unwrap();

        let archived = run(&engine, dir.path(), &[d], now, 0.9, 90.0).unwrap();
        assert_eq!(archived, 1);
        assert!(engine.get_by_hash(&hash).unwrap().is_none());

        let files: Vec<_> = std::fs::read_dir(dir.path().join("daily")).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn protected_memory_survives_forgetting() {
        let engine = engine();
        let now = 900.0 * 86_400.0;
        let d = decayed_at(&engine, "protected note", "critical", 0.0, now);
        let hash = d.memory.content_hash.clone();
        let dir = tempfile::tempdir().unwrap();

        let archived = run(&engine, dir.path(), &[d], now, 0.9, 1.0).unwrap();
        assert_eq!(archived, 0);
        assert!(engine.get_by_hash(&hash).unwrap().is_some());
    }

    #[test]
    fn relevance_above_threshold_survives() {
        let engine = engine();
        let now = 10.0;
        let d = decayed_at(&engine, "fresh note", "t", 0.0, now);
        let hash = d.memory.content_hash.clone();
        let dir = tempfile::tempdir().unwrap();

        let archived = run(&engine, dir.path(), &[d], now, 0.1, 90.0).unwrap();
        assert_eq!(archived, 0);
        assert!(engine.get_by_hash(&hash).unwrap().is_some());
    }
}
