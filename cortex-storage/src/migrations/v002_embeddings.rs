use rusqlite::Connection;

/// Embeddings live in their own table, one row per memory, so the
/// dimensionality and model name can be validated independent of the
/// memory row itself (e.g. when the embedding provider changes).
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE embeddings (
            content_hash TEXT PRIMARY KEY REFERENCES memories(content_hash) ON DELETE CASCADE,
            vector       BLOB NOT NULL,
            dimensions   INTEGER NOT NULL,
            model_name   TEXT NOT NULL
        );

        CREATE INDEX idx_embeddings_model ON embeddings(model_name);
        ",
    )
}
