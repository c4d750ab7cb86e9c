use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::Memory;

use crate::queries::memory_crud::row_to_memory;
use crate::to_storage_err;

/// Physically delete tombstones older than `older_than_days`. Cascades to
/// `embeddings` and `graph_edges` via `ON DELETE CASCADE`.
pub fn purge_tombstones(conn: &Connection, cutoff: f64) -> CortexResult<usize> {
    let affected = conn
        .execute(
            "DELETE FROM memories WHERE deleted_at IS NOT NULL AND deleted_at < ?1",
            params![cutoff],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(affected)
}

pub fn live_count(conn: &Connection) -> CortexResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM memories WHERE deleted_at IS NULL", [], |r| r.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

pub fn tombstone_count(conn: &Connection) -> CortexResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM memories WHERE deleted_at IS NOT NULL", [], |r| r.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

/// Live memories created before `cutoff` (epoch seconds), oldest first, for
/// the consolidator's per-horizon candidate selection. Not part of the
/// `MemoryStore` contract — the consolidator depends on `cortex-storage`
/// directly for this, since bulk listing has no generic-backend use beyond
/// consolidation.
pub fn list_consolidation_candidates(conn: &Connection, cutoff: f64, limit: usize) -> CortexResult<Vec<Memory>> {
    let sql = "
        SELECT m.content_hash, m.content, m.tags, m.memory_type, m.metadata,
               m.created_at, m.updated_at, m.deleted_at, e.vector, e.dimensions
        FROM memories m
        LEFT JOIN embeddings e ON e.content_hash = m.content_hash
        WHERE m.deleted_at IS NULL AND m.created_at < ?1
        ORDER BY m.created_at ASC
        LIMIT ?2
    ";
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cutoff, limit as i64], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(out)
}

/// Number of graph edges (either direction) touching `hash` — the
/// `connection_count` term in the decay formula.
pub fn connection_count(conn: &Connection, hash: &str) -> CortexResult<usize> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM graph_edges WHERE source_hash = ?1 OR target_hash = ?1",
            params![hash],
            |r| r.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use crate::queries::memory_crud::{insert_memory, tombstone};
    use cortex_core::memory::{Memory, MemoryType, Metadata};

    #[test]
    fn purge_only_removes_old_tombstones() {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_all(&conn).unwrap();
        let m = Memory::new("x", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let hash = m.content_hash.clone();
        insert_memory(&conn, &m).unwrap();
        tombstone(&conn, &hash, 5.0).unwrap();

        assert_eq!(purge_tombstones(&conn, 1.0).unwrap(), 0);
        assert_eq!(purge_tombstones(&conn, 10.0).unwrap(), 1);
        assert_eq!(live_count(&conn).unwrap(), 0);
        assert_eq!(tombstone_count(&conn).unwrap(), 0);
    }
}
