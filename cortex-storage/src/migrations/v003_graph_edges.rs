use rusqlite::Connection;

/// Association graph between memories. Symmetric relationship types
/// (`related`, `contradicts`) are stored as two rows, one per direction —
/// see `cortex_core::ontology::is_symmetric` — so every query can assume a
/// single directed traversal.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE graph_edges (
            source_hash       TEXT NOT NULL REFERENCES memories(content_hash) ON DELETE CASCADE,
            target_hash       TEXT NOT NULL REFERENCES memories(content_hash) ON DELETE CASCADE,
            relationship_type TEXT NOT NULL,
            similarity        REAL NOT NULL,
            metadata          TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (source_hash, target_hash, relationship_type)
        );

        CREATE INDEX idx_graph_edges_target ON graph_edges(target_hash);
        CREATE INDEX idx_graph_edges_type ON graph_edges(relationship_type);
        ",
    )
}
