//! PRAGMA configuration applied to every SQLite connection, on every open
//! — pragmas do not persist across connections, so the read pool and the
//! writer each re-apply them.
//!
//! `busy_timeout >= 10s`, WAL mode, `cache_size >= 20000` pages, per the
//! storage engine's concurrency requirements.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn apply_pragmas(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 10000;
        PRAGMA cache_size = -20000;
        PRAGMA foreign_keys = ON;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Read connections skip `journal_mode` (irrelevant for read-only handles)
/// but still need the busy timeout and cache size.
pub fn apply_read_pragmas(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        PRAGMA busy_timeout = 10000;
        PRAGMA cache_size = -20000;
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> CortexResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
