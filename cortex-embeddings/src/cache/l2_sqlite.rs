//! Persistent embedding cache, keyed by `(content_hash, model_name)` so a
//! model swap doesn't serve stale vectors under the same key.

use rusqlite::{params, Connection};

use cortex_core::errors::{CortexError, CortexResult};

pub struct L2Cache {
    conn: Mutex<Connection>,
}

use std::sync::Mutex;

impl L2Cache {
    pub fn open(path: &std::path::Path) -> CortexResult<Self> {
        let conn = Connection::open(path).map_err(|e| CortexError::TransientBackendError {
            reason: format!("embedding cache open failed: {e}"),
        })?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS embedding_cache (
                content_hash TEXT NOT NULL,
                model_name   TEXT NOT NULL,
                embedding    BLOB NOT NULL,
                dimensions   INTEGER NOT NULL,
                PRIMARY KEY (content_hash, model_name)
            );",
        )
        .map_err(|e| CortexError::SchemaError { reason: e.to_string() })?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> CortexResult<Self> {
        Self::open(std::path::Path::new(":memory:"))
    }

    pub fn get(&self, content_hash: &str, model_name: &str) -> CortexResult<Option<Vec<f32>>> {
        let conn = self.conn.lock().map_err(|_| CortexError::TransientBackendError {
            reason: "embedding cache connection lock poisoned".to_string(),
        })?;
        let result = conn.query_row(
            "SELECT embedding, dimensions FROM embedding_cache WHERE content_hash = ?1 AND model_name = ?2",
            params![content_hash, model_name],
            |row| {
                let blob: Vec<u8> = row.get(0)?;
                let dims: i64 = row.get(1)?;
                Ok((blob, dims as usize))
            },
        );
        match result {
            Ok((blob, dims)) => Ok(Some(bytes_to_f32(&blob, dims))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CortexError::TransientBackendError { reason: e.to_string() }),
        }
    }

    pub fn put(&self, content_hash: &str, model_name: &str, embedding: &[f32]) -> CortexResult<()> {
        let conn = self.conn.lock().map_err(|_| CortexError::TransientBackendError {
            reason: "embedding cache connection lock poisoned".to_string(),
        })?;
        conn.execute(
            "INSERT INTO embedding_cache (content_hash, model_name, embedding, dimensions)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(content_hash, model_name) DO UPDATE SET embedding = excluded.embedding",
            params![content_hash, model_name, f32_to_bytes(embedding), embedding.len() as i64],
        )
        .map_err(|e| CortexError::TransientBackendError { reason: e.to_string() })?;
        Ok(())
    }
}

fn f32_to_bytes(v: &[f32]) -> Vec<u8> {
    v.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn bytes_to_f32(bytes: &[u8], dims: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(dims);
    for chunk in bytes.chunks_exact(4) {
        out.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_embedding() {
        let cache = L2Cache::open_in_memory().unwrap();
        cache.put("hash1", "model-a", &[1.0, 2.0, 3.0]).unwrap();
        let got = cache.get("hash1", "model-a").unwrap();
        assert_eq!(got, Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn model_swap_misses() {
        let cache = L2Cache::open_in_memory().unwrap();
        cache.put("hash1", "model-a", &[1.0]).unwrap();
        assert_eq!(cache.get("hash1", "model-b").unwrap(), None);
    }
}
