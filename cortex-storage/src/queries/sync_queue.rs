//! Persisted sync-operation queue (`sync_queue` table, migration v004).
//!
//! Owned here rather than in `cortex-hybrid` because the table lives in the
//! same SQLite file as everything else the local store manages — the
//! hybrid backend only ever talks to it through `StorageEngine`'s inherent
//! methods, never touches the connection pool directly.

use rusqlite::{params, Connection, OptionalExtension};

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

/// The three mutation kinds the hybrid backend propagates to the cloud
/// store. Coalescing rules: a later `Delete` replaces any pending
/// `Store`/`Update`; a later `Update` merges into a pending `Store` (stays
/// `Store`, payload refreshed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Store,
    Update,
    Delete,
}

impl OpType {
    fn as_str(self) -> &'static str {
        match self {
            OpType::Store => "store",
            OpType::Update => "update",
            OpType::Delete => "delete",
        }
    }

    fn parse(s: &str) -> OpType {
        match s {
            "update" => OpType::Update,
            "delete" => OpType::Delete,
            _ => OpType::Store,
        }
    }
}

/// One row of the persisted sync queue.
#[derive(Debug, Clone)]
pub struct SyncOpRow {
    pub content_hash: String,
    pub op_type: OpType,
    /// JSON-serialized `Memory` snapshot taken at enqueue time. `None` for
    /// `Delete` — the worker only needs the hash to propagate a tombstone.
    pub payload: Option<String>,
    pub enqueued_at: f64,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub dead_letter: bool,
}

fn row_to_op(row: &rusqlite::Row) -> rusqlite::Result<SyncOpRow> {
    let op_str: String = row.get(1)?;
    let dead_letter: i64 = row.get(6)?;
    Ok(SyncOpRow {
        content_hash: row.get(0)?,
        op_type: OpType::parse(&op_str),
        payload: row.get(2)?,
        enqueued_at: row.get(3)?,
        attempts: row.get(4)?,
        last_error: row.get(5)?,
        dead_letter: dead_letter != 0,
    })
}

/// Enqueue a mutation for `hash`, applying the per-hash coalescing rules.
/// Resets `attempts`/`dead_letter` — a fresh write supersedes whatever
/// retry state an earlier queued op for the same hash was in.
pub fn enqueue(conn: &Connection, hash: &str, new_op: OpType, payload: Option<&str>, now: f64) -> CortexResult<()> {
    let existing: Option<String> = conn
        .query_row("SELECT operation FROM sync_queue WHERE content_hash = ?1", params![hash], |r| r.get(0))
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let (final_op, final_payload) = match (existing.as_deref().map(OpType::parse), new_op) {
        // A later delete always wins, regardless of what was pending.
        (_, OpType::Delete) => (OpType::Delete, None),
        // An update merges into a pending store: stays `Store`, payload refreshed.
        (Some(OpType::Store), OpType::Update) => (OpType::Store, payload),
        // Otherwise the newly enqueued op replaces whatever was pending
        // (including a pending delete being superseded by a fresh store,
        // i.e. resurrection propagating to the cloud side).
        _ => (new_op, payload),
    };

    conn.execute(
        "INSERT INTO sync_queue (content_hash, operation, payload, enqueued_at, attempts, last_error, dead_letter)
         VALUES (?1, ?2, ?3, ?4, 0, NULL, 0)
         ON CONFLICT(content_hash) DO UPDATE SET
            operation = excluded.operation, payload = excluded.payload,
            enqueued_at = excluded.enqueued_at, attempts = 0, last_error = NULL, dead_letter = 0",
        params![hash, final_op.as_str(), final_payload, now],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Pop up to `limit` non-dead-lettered ops in FIFO (`enqueued_at`) order.
/// Does not remove them — the caller removes on success or records a
/// failed attempt.
pub fn dequeue_batch(conn: &Connection, limit: usize) -> CortexResult<Vec<SyncOpRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT content_hash, operation, payload, enqueued_at, attempts, last_error, dead_letter
             FROM sync_queue WHERE dead_letter = 0 ORDER BY enqueued_at ASC LIMIT ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map(params![limit as i64], row_to_op).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn remove(conn: &Connection, hash: &str) -> CortexResult<()> {
    conn.execute("DELETE FROM sync_queue WHERE content_hash = ?1", params![hash])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Record a failed attempt. Once `attempts` reaches `max_attempts` the row
/// is parked in the dead-letter state instead of being retried further.
pub fn record_failure(conn: &Connection, hash: &str, error: &str, max_attempts: i64) -> CortexResult<bool> {
    conn.execute(
        "UPDATE sync_queue SET attempts = attempts + 1, last_error = ?2 WHERE content_hash = ?1",
        params![hash, error],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let attempts: i64 = conn
        .query_row("SELECT attempts FROM sync_queue WHERE content_hash = ?1", params![hash], |r| r.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if attempts >= max_attempts {
        conn.execute("UPDATE sync_queue SET dead_letter = 1 WHERE content_hash = ?1", params![hash])
            .map_err(|e| to_storage_err(e.to_string()))?;
        Ok(true)
    } else {
        Ok(false)
    }
}

pub fn dead_letter_ops(conn: &Connection) -> CortexResult<Vec<SyncOpRow>> {
    let mut stmt = conn
        .prepare(
            "SELECT content_hash, operation, payload, enqueued_at, attempts, last_error, dead_letter
             FROM sync_queue WHERE dead_letter = 1 ORDER BY enqueued_at ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map([], row_to_op).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn depth(conn: &Connection) -> CortexResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM sync_queue WHERE dead_letter = 0", [], |r| r.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

pub fn dead_letter_count(conn: &Connection) -> CortexResult<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM sync_queue WHERE dead_letter = 1", [], |r| r.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_all(&conn).unwrap();
        conn
    }

    #[test]
    fn later_delete_replaces_pending_store() {
        let conn = conn();
        enqueue(&conn, "h1", OpType::Store, Some("{}"), 1.0).unwrap();
        enqueue(&conn, "h1", OpType::Delete, None, 2.0).unwrap();
        let batch = dequeue_batch(&conn, 10).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].op_type, OpType::Delete);
        assert!(batch[0].payload.is_none());
    }

    #[test]
    fn later_update_merges_into_pending_store() {
        let conn = conn();
        enqueue(&conn, "h1", OpType::Store, Some("{\"v\":1}"), 1.0).unwrap();
        enqueue(&conn, "h1", OpType::Update, Some("{\"v\":2}"), 2.0).unwrap();
        let batch = dequeue_batch(&conn, 10).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].op_type, OpType::Store);
        assert_eq!(batch[0].payload.as_deref(), Some("{\"v\":2}"));
    }

    #[test]
    fn failure_parks_in_dead_letter_after_max_attempts() {
        let conn = conn();
        enqueue(&conn, "h1", OpType::Store, Some("{}"), 1.0).unwrap();
        assert!(!record_failure(&conn, "h1", "boom", 3).unwrap());
        assert!(!record_failure(&conn, "h1", "boom", 3).unwrap());
        assert!(record_failure(&conn, "h1", "boom", 3).unwrap());
        assert_eq!(dequeue_batch(&conn, 10).unwrap().len(), 0);
        assert_eq!(dead_letter_count(&conn).unwrap(), 1);
    }

    #[test]
    fn fifo_order_by_enqueue_time() {
        let conn = conn();
        enqueue(&conn, "h2", OpType::Store, Some("{}"), 2.0).unwrap();
        enqueue(&conn, "h1", OpType::Store, Some("{}"), 1.0).unwrap();
        let batch = dequeue_batch(&conn, 10).unwrap();
        assert_eq!(batch[0].content_hash, "h1");
        assert_eq!(batch[1].content_hash, "h2");
    }
}
