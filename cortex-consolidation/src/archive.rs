//! Append-only JSON archival: an archive directory with subfolders
//! `daily/`, `compressed/`, `metadata/`.
//!
//! A write here is what makes a tombstoned memory recoverable offline —
//! the row itself is only soft-deleted in the local store.

use std::fs;
use std::path::Path;

use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::Memory;

use crate::stats::RunStats;

fn write_json(dir: &Path, filename: &str, value: &impl serde::Serialize) -> CortexResult<()> {
    fs::create_dir_all(dir)
        .map_err(|e| CortexError::ValidationError { reason: format!("archive dir {}: {e}", dir.display()) })?;
    let path = dir.join(filename);
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| CortexError::ValidationError { reason: format!("archive serialize: {e}") })?;
    fs::write(&path, json)
        .map_err(|e| CortexError::ValidationError { reason: format!("archive write {}: {e}", path.display()) })?;
    Ok(())
}

/// Archive one forgotten memory under `archive_path/daily/`, filename keyed
/// by hash and archival time so a repeated archival of a resurrected-then-
/// re-forgotten memory never overwrites an earlier snapshot.
pub fn write_daily(archive_path: &Path, memory: &Memory, now: f64) -> CortexResult<()> {
    let dir = archive_path.join("daily");
    let filename = format!("{}_{}.json", memory.content_hash, now as i64);
    write_json(&dir, &filename, memory)
}

/// Persist a cluster's compression record under `archive_path/compressed/`.
pub fn write_compressed(archive_path: &Path, summary_hash: &str, member_hashes: &[String], now: f64) -> CortexResult<()> {
    let dir = archive_path.join("compressed");
    let filename = format!("{summary_hash}_{}.json", now as i64);
    write_json(&dir, &filename, &serde_json::json!({ "summary_hash": summary_hash, "members": member_hashes }))
}

/// Persist a per-horizon run's statistics under `archive_path/metadata/`.
pub fn write_run_stats(archive_path: &Path, stats: &RunStats, now: f64) -> CortexResult<()> {
    let dir = archive_path.join("metadata");
    let filename = format!("{}_{}.json", stats.horizon, now as i64);
    write_json(&dir, &filename, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::horizon::Horizon;
    use cortex_core::memory::{MemoryType, Metadata};

    #[test]
    fn writes_a_recoverable_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let memory = Memory::new("content", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        write_daily(dir.path(), &memory, 2.0).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path().join("daily")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn writes_run_stats() {
        let dir = tempfile::tempdir().unwrap();
        let stats = RunStats::starting(Horizon::Daily);
        write_run_stats(dir.path(), &stats, 2.0).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path().join("metadata")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn writes_compressed_record() {
        let dir = tempfile::tempdir().unwrap();
        write_compressed(dir.path(), "summary-hash", &["a".to_string(), "b".to_string()], 3.0).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path().join("compressed")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
