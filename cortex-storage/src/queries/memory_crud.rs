//! Row <-> `Memory` mapping and the basic CRUD operations shared by every
//! query module.

use rusqlite::{params, Connection, OptionalExtension, Row};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{Memory, Metadata};
use cortex_core::ontology::validate_type;

use crate::to_storage_err;

/// Build a `Memory` from a joined `memories` + `embeddings` row. Column
/// order: content_hash, content, tags, memory_type, metadata, created_at,
/// updated_at, deleted_at, vector, dimensions.
pub(crate) fn row_to_memory(row: &Row) -> rusqlite::Result<Memory> {
    let tags_json: String = row.get(2)?;
    let metadata_json: String = row.get(4)?;
    let vector_blob: Option<Vec<u8>> = row.get(8)?;
    let dims: Option<i64> = row.get(9)?;

    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
    let metadata_map = serde_json::from_str(&metadata_json).unwrap_or_default();
    let embedding = match (vector_blob, dims) {
        (Some(blob), Some(dims)) => crate::queries::vector_search::bytes_to_f32(&blob, dims as usize),
        _ => Vec::new(),
    };

    let type_str: String = row.get(3)?;

    Ok(Memory {
        content_hash: row.get(0)?,
        content: row.get(1)?,
        tags,
        memory_type: validate_type(&type_str),
        metadata: Metadata(metadata_map),
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        deleted_at: row.get(7)?,
        embedding,
    })
}

const SELECT_JOINED: &str = "
    SELECT m.content_hash, m.content, m.tags, m.memory_type, m.metadata,
           m.created_at, m.updated_at, m.deleted_at, e.vector, e.dimensions
    FROM memories m
    LEFT JOIN embeddings e ON e.content_hash = m.content_hash
";

pub fn get_by_hash(conn: &Connection, hash: &str) -> CortexResult<Option<Memory>> {
    conn.query_row(&format!("{SELECT_JOINED} WHERE m.content_hash = ?1"), params![hash], row_to_memory)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Returns `Ok(None)` if no row with this hash exists at all (neither live
/// nor tombstoned), so the caller can distinguish "fresh insert" from
/// "resurrect" from "duplicate".
pub fn find_any_by_hash(conn: &Connection, hash: &str) -> CortexResult<Option<Memory>> {
    get_by_hash(conn, hash)
}

pub fn insert_memory(conn: &Connection, memory: &Memory) -> CortexResult<()> {
    conn.execute(
        "INSERT INTO memories
            (content_hash, content, tags, memory_type, metadata, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            memory.content_hash,
            memory.content,
            serde_json::to_string(&memory.tags).unwrap_or_default(),
            memory.memory_type.as_str(),
            serde_json::to_string(&memory.metadata.0).unwrap_or_default(),
            memory.created_at,
            memory.updated_at,
            memory.deleted_at,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Overwrite an existing row in place (used by resurrect: same hash, fresh
/// timestamps, `deleted_at` cleared).
pub fn replace_memory(conn: &Connection, memory: &Memory) -> CortexResult<()> {
    conn.execute(
        "UPDATE memories SET content = ?2, tags = ?3, memory_type = ?4, metadata = ?5,
            created_at = ?6, updated_at = ?7, deleted_at = ?8
         WHERE content_hash = ?1",
        params![
            memory.content_hash,
            memory.content,
            serde_json::to_string(&memory.tags).unwrap_or_default(),
            memory.memory_type.as_str(),
            serde_json::to_string(&memory.metadata.0).unwrap_or_default(),
            memory.created_at,
            memory.updated_at,
            memory.deleted_at,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_metadata_and_tags(
    conn: &Connection,
    hash: &str,
    metadata_json: &str,
    tags_json: Option<&str>,
    now: f64,
) -> CortexResult<bool> {
    let updated = match tags_json {
        Some(tags) => conn.execute(
            "UPDATE memories SET metadata = ?2, tags = ?3, updated_at = ?4 WHERE content_hash = ?1 AND deleted_at IS NULL",
            params![hash, metadata_json, tags, now],
        ),
        None => conn.execute(
            "UPDATE memories SET metadata = ?2, updated_at = ?3 WHERE content_hash = ?1 AND deleted_at IS NULL",
            params![hash, metadata_json, now],
        ),
    }
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(updated > 0)
}

pub fn tombstone(conn: &Connection, hash: &str, now: f64) -> CortexResult<bool> {
    let updated = conn
        .execute(
            "UPDATE memories SET deleted_at = ?2, updated_at = ?2 WHERE content_hash = ?1 AND deleted_at IS NULL",
            params![hash, now],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(updated > 0)
}
