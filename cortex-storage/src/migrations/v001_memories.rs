use rusqlite::Connection;

/// Core memory table. `content_hash` is the primary key; `deleted_at` set
/// means the row is a tombstone rather than physically removed (soft delete).
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE memories (
            content_hash  TEXT PRIMARY KEY,
            content       TEXT NOT NULL,
            tags          TEXT NOT NULL DEFAULT '[]',
            memory_type   TEXT NOT NULL,
            metadata      TEXT NOT NULL DEFAULT '{}',
            created_at    REAL NOT NULL,
            updated_at    REAL NOT NULL,
            deleted_at    REAL
        );

        CREATE INDEX idx_memories_created_at ON memories(created_at DESC);
        CREATE INDEX idx_memories_deleted_at ON memories(deleted_at);
        CREATE INDEX idx_memories_memory_type ON memories(memory_type);
        ",
    )
}
