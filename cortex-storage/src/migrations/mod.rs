mod v001_memories;
mod v002_embeddings;
mod v003_graph_edges;
mod v004_sync_queue;

use rusqlite::Connection;

use cortex_core::errors::{CortexError, CortexResult, StorageError};

/// Run every migration in order inside one transaction, tracked by a
/// `schema_version` table so re-opening an already-migrated database is a
/// no-op.
pub fn run_all(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )
    .map_err(|e| to_migration_err(0, e))?;

    let current: u32 = conn
        .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
        .map_err(|e| to_migration_err(0, e))?;

    let migrations: [(u32, fn(&Connection) -> rusqlite::Result<()>); 4] = [
        (1, v001_memories::migrate),
        (2, v002_embeddings::migrate),
        (3, v003_graph_edges::migrate),
        (4, v004_sync_queue::migrate),
    ];

    for (version, migrate) in migrations {
        if version <= current {
            continue;
        }
        migrate(conn).map_err(|e| to_migration_err(version, e))?;
        conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
            .map_err(|e| to_migration_err(version, e))?;
    }
    Ok(())
}

fn to_migration_err(version: u32, e: rusqlite::Error) -> CortexError {
    CortexError::Storage(StorageError::MigrationFailed { version, reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        run_all(&conn).unwrap();
        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(version, 4);
    }

    #[test]
    fn creates_expected_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_all(&conn).unwrap();
        for table in ["memories", "embeddings", "graph_edges", "sync_queue"] {
            let exists: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert!(exists, "missing table {table}");
        }
    }
}
