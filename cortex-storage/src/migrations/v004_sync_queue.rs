use rusqlite::Connection;

/// Persisted queue of pending cloud-sync operations, owned by
/// `cortex-hybrid`. Lives in the local store so a pending sync survives a
/// process restart without a second database file.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE sync_queue (
            content_hash TEXT PRIMARY KEY,
            operation    TEXT NOT NULL,
            payload      TEXT NOT NULL,
            enqueued_at  REAL NOT NULL,
            attempts     INTEGER NOT NULL DEFAULT 0,
            last_error   TEXT,
            dead_letter  INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX idx_sync_queue_enqueued_at ON sync_queue(enqueued_at);
        CREATE INDEX idx_sync_queue_dead_letter ON sync_queue(dead_letter);
        ",
    )
}
