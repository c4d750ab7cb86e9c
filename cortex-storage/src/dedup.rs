//! Duplicate detection (§4.4): exact-hash collisions are free (the primary
//! key enforces them); semantic duplicates require a bounded scan over
//! recent memories.

use rusqlite::Connection;

use cortex_core::config::DedupConfig;
use cortex_core::errors::CortexResult;
use cortex_core::memory::Memory;

use crate::queries::memory_crud::find_any_by_hash;
use crate::queries::vector_search::{cosine_similarity, top_k_by_similarity};

/// What `check` found before a new memory is inserted.
pub enum DedupOutcome {
    /// No collision; safe to insert as a brand-new row.
    New,
    /// An existing row with this hash is live.
    ExactDuplicate,
    /// An existing row with this hash is a tombstone — insertion should
    /// resurrect it rather than fail.
    Resurrectable(Memory),
    /// A different, live memory is semantically close enough to reject.
    SemanticDuplicate { existing_hash: String, similarity: f64 },
}

/// `now` and `config.semantic_window_hours` bound the scan: only memories
/// created within the window are compared, so dedup cost stays proportional
/// to recent write volume, not corpus size.
pub fn check(
    conn: &Connection,
    candidate: &Memory,
    now: f64,
    config: &DedupConfig,
) -> CortexResult<DedupOutcome> {
    if let Some(existing) = find_any_by_hash(conn, &candidate.content_hash)? {
        return Ok(if existing.is_live() {
            DedupOutcome::ExactDuplicate
        } else {
            DedupOutcome::Resurrectable(existing)
        });
    }

    if !config.semantic_enabled || candidate.embedding.is_empty() {
        return Ok(DedupOutcome::New);
    }

    let window_start = now - (config.semantic_window_hours as f64 * 3600.0);
    let candidates = top_k_by_similarity(conn, &candidate.embedding, usize::MAX, Some(window_start), None)?;

    for (existing, _) in candidates {
        if existing.content_hash == candidate.content_hash {
            continue;
        }
        let sim = cosine_similarity(&existing.embedding, &candidate.embedding);
        if sim >= config.semantic_threshold {
            return Ok(DedupOutcome::SemanticDuplicate {
                existing_hash: existing.content_hash,
                similarity: sim,
            });
        }
    }
    Ok(DedupOutcome::New)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use crate::queries::memory_crud::insert_memory;
    use crate::queries::vector_search::store_embedding;
    use cortex_core::memory::{MemoryType, Metadata};

    fn conn_with_schema() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_all(&conn).unwrap();
        conn
    }

    #[test]
    fn exact_duplicate_detected() {
        let conn = conn_with_schema();
        let m = Memory::new("same text", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![1.0, 0.0]);
        insert_memory(&conn, &m).unwrap();
        let config = DedupConfig { semantic_enabled: false, ..Default::default() };
        let outcome = check(&conn, &m, 2.0, &config).unwrap();
        assert!(matches!(outcome, DedupOutcome::ExactDuplicate));
    }

    #[test]
    fn semantic_duplicate_within_window() {
        let conn = conn_with_schema();
        let existing = Memory::new("first phrasing", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![1.0, 0.0]);
        insert_memory(&conn, &existing).unwrap();
        store_embedding(&conn, &existing.content_hash, &existing.embedding, "hash-v1").unwrap();

        let candidate = Memory::new("second phrasing", "t", MemoryType::Observation, Metadata::new(), 2.0, vec![0.99, 0.01]);
        let config = DedupConfig { semantic_enabled: true, semantic_window_hours: 24, semantic_threshold: 0.9 };
        let outcome = check(&conn, &candidate, 2.0, &config).unwrap();
        assert!(matches!(outcome, DedupOutcome::SemanticDuplicate { .. }));
    }

    #[test]
    fn tombstoned_hash_is_resurrectable() {
        let conn = conn_with_schema();
        let m = Memory::new("gone text", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        insert_memory(&conn, &m).unwrap();
        crate::queries::memory_crud::tombstone(&conn, &m.content_hash, 2.0).unwrap();

        let config = DedupConfig { semantic_enabled: false, ..Default::default() };
        let outcome = check(&conn, &m, 3.0, &config).unwrap();
        assert!(matches!(outcome, DedupOutcome::Resurrectable(_)));
    }
}
