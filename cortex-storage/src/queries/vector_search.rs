//! Brute-force cosine-similarity scan over stored embeddings.
//!
//! No vector index (sqlite-vec / faiss) is loaded; at corpus sizes this
//! system targets, a full scan is fast enough and trivially correct.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn f32_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

pub fn bytes_to_f32(bytes: &[u8], dims: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(dims);
    for chunk in bytes.chunks_exact(4) {
        out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    out
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64) * (*x as f64);
        norm_b += (*y as f64) * (*y as f64);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

pub fn store_embedding(
    conn: &Connection,
    content_hash: &str,
    vector: &[f32],
    model_name: &str,
) -> CortexResult<()> {
    conn.execute(
        "INSERT INTO embeddings (content_hash, vector, dimensions, model_name)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(content_hash) DO UPDATE SET
            vector = excluded.vector, dimensions = excluded.dimensions, model_name = excluded.model_name",
        params![content_hash, f32_to_bytes(vector), vector.len() as i64, model_name],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Scan every live row with an embedding, score it against `query_vector`,
/// and return the top `k` by cosine similarity descending.
pub fn top_k_by_similarity(
    conn: &Connection,
    query_vector: &[f32],
    k: usize,
    created_after: Option<f64>,
    created_before: Option<f64>,
) -> CortexResult<Vec<(cortex_core::memory::Memory, f64)>> {
    let mut stmt = conn
        .prepare(
            "SELECT m.content_hash, m.content, m.tags, m.memory_type, m.metadata,
                    m.created_at, m.updated_at, m.deleted_at, e.vector, e.dimensions
             FROM memories m
             JOIN embeddings e ON e.content_hash = m.content_hash
             WHERE m.deleted_at IS NULL
               AND (?1 IS NULL OR m.created_at >= ?1)
               AND (?2 IS NULL OR m.created_at <= ?2)",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![created_after, created_before], super::memory_crud::row_to_memory)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored = Vec::new();
    for row in rows {
        let memory = row.map_err(|e| to_storage_err(e.to_string()))?;
        let score = cosine_similarity(&memory.embedding, query_vector);
        scored.push((memory, score));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    Ok(scored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-9);
    }

    #[test]
    fn byte_round_trip() {
        let v = vec![1.5f32, -2.25, 3.0];
        let bytes = f32_to_bytes(&v);
        assert_eq!(bytes_to_f32(&bytes, v.len()), v);
    }

    #[test]
    fn mismatched_length_yields_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }
}
