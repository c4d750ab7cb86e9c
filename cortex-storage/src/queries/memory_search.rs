//! Tag and substring search. Both are pure SQL — no embedding involved.

use rusqlite::Connection;

use cortex_core::errors::CortexResult;
use cortex_core::memory::Memory;
use cortex_core::traits::TagMode;

use crate::to_storage_err;

use super::memory_crud::row_to_memory;

const SELECT_JOINED: &str = "
    SELECT m.content_hash, m.content, m.tags, m.memory_type, m.metadata,
           m.created_at, m.updated_at, m.deleted_at, e.vector, e.dimensions
    FROM memories m
    LEFT JOIN embeddings e ON e.content_hash = m.content_hash
";

/// `tags` must already be normalized (lowercase, deduped) by the caller —
/// matching happens against the stored JSON array's own normalized form.
pub fn search_by_tag(conn: &Connection, tags: &[String], mode: TagMode) -> CortexResult<Vec<Memory>> {
    if tags.is_empty() {
        return Ok(Vec::new());
    }

    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_JOINED} WHERE m.deleted_at IS NULL ORDER BY m.created_at DESC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let memory = row.map_err(|e| to_storage_err(e.to_string()))?;
        let matches = match mode {
            TagMode::All => tags.iter().all(|t| memory.tags.contains(t)),
            TagMode::Any => tags.iter().any(|t| memory.tags.contains(t)),
        };
        if matches {
            out.push(memory);
        }
    }
    Ok(out)
}

pub fn exact_match(conn: &Connection, substring: &str) -> CortexResult<Vec<Memory>> {
    let needle = format!("%{}%", substring.to_lowercase().replace('%', "\\%").replace('_', "\\_"));
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_JOINED} WHERE m.deleted_at IS NULL AND LOWER(m.content) LIKE ?1 ESCAPE '\\' ORDER BY m.created_at DESC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([needle], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn delete_by_tag(conn: &Connection, tag: &str, now: f64) -> CortexResult<usize> {
    delete_by_tags(conn, std::slice::from_ref(&tag.to_string()), TagMode::Any, now)
}

pub fn delete_by_tags(
    conn: &Connection,
    tags: &[String],
    mode: TagMode,
    now: f64,
) -> CortexResult<usize> {
    let matching = search_by_tag(conn, tags, mode)?;
    let mut count = 0;
    for memory in matching {
        if super::memory_crud::tombstone(conn, &memory.content_hash, now)? {
            count += 1;
        }
    }
    Ok(count)
}

pub fn delete_by_timeframe(
    conn: &Connection,
    start: f64,
    end: f64,
    tag: Option<&str>,
    now: f64,
) -> CortexResult<usize> {
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_JOINED} WHERE m.deleted_at IS NULL AND m.created_at >= ?1 AND m.created_at <= ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(rusqlite::params![start, end], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut count = 0;
    for row in rows {
        let memory = row.map_err(|e| to_storage_err(e.to_string()))?;
        if let Some(t) = tag {
            if !memory.tags.iter().any(|mt| mt == t) {
                continue;
            }
        }
        if super::memory_crud::tombstone(conn, &memory.content_hash, now)? {
            count += 1;
        }
    }
    Ok(count)
}

/// Live hashes created within `[start, end]`, optionally narrowed to one
/// tag. Used by the hybrid backend to capture which hashes a
/// `delete_by_timeframe` call is about to tombstone, so it can enqueue a
/// sync op per hash before handing the actual tombstoning off to the local
/// store's own `delete_by_timeframe`.
pub fn live_hashes_in_timeframe(
    conn: &Connection,
    start: f64,
    end: f64,
    tag: Option<&str>,
) -> CortexResult<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_JOINED} WHERE m.deleted_at IS NULL AND m.created_at >= ?1 AND m.created_at <= ?2"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(rusqlite::params![start, end], row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut out = Vec::new();
    for row in rows {
        let memory = row.map_err(|e| to_storage_err(e.to_string()))?;
        if let Some(t) = tag {
            if !memory.tags.iter().any(|mt| mt == t) {
                continue;
            }
        }
        out.push(memory.content_hash);
    }
    Ok(out)
}
