//! `StorageEngine` — the local vector store. Wires the connection pool,
//! dedup, and query modules together behind the `MemoryStore` contract.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use cortex_core::config::DedupConfig;
use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::{Direction, GraphEdge, Memory, RelationshipType};
use cortex_core::tags::normalize_tags;
use cortex_core::traits::{
    ConnectedNode, EmbeddingProvider, HealthReport, MemoryStore, MetadataPatch, Subgraph, TagMode,
};
use cortex_embeddings::EmbeddingEngine;

use crate::dedup::{self, DedupOutcome};
use crate::migrations;
use crate::pool::ConnectionPool;
use crate::queries::sync_queue::{self, OpType, SyncOpRow};
use crate::queries::{maintenance, memory_crud, memory_search, relationship_ops, vector_search};

pub struct StorageEngine {
    pool: ConnectionPool,
    embeddings: Arc<EmbeddingEngine>,
    dedup_config: DedupConfig,
}

fn now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl StorageEngine {
    pub fn open(path: &Path, embeddings: Arc<EmbeddingEngine>, dedup_config: DedupConfig) -> CortexResult<Self> {
        let pool = ConnectionPool::open(path)?;
        pool.writer.with_conn_sync(migrations::run_all)?;
        info!(path = %path.display(), "opened local vector store");
        Ok(Self { pool, embeddings, dedup_config })
    }

    pub fn open_in_memory(embeddings: Arc<EmbeddingEngine>, dedup_config: DedupConfig) -> CortexResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        pool.writer.with_conn_sync(migrations::run_all)?;
        Ok(Self { pool, embeddings, dedup_config })
    }

    fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        self.embeddings.embed(text)
    }

    /// Live memories created before `cutoff` (epoch seconds), for the
    /// consolidator's per-horizon candidate selection. Inherent rather than
    /// part of `MemoryStore` — bulk listing has no use outside
    /// consolidation, so it isn't part of the shared backend contract.
    pub fn consolidation_candidates(&self, cutoff: f64, limit: usize) -> CortexResult<Vec<Memory>> {
        self.pool.with_reader(|conn| maintenance::list_consolidation_candidates(conn, cutoff, limit))
    }

    /// Number of graph edges touching `hash`, for the decay formula's
    /// `connection_count` term.
    pub fn connection_count(&self, hash: &str) -> CortexResult<usize> {
        self.pool.with_reader(|conn| maintenance::connection_count(conn, hash))
    }

    /// Live hashes created within `[start, end]`, optionally narrowed to
    /// one tag. Inherent rather than part of `MemoryStore` — only the
    /// hybrid backend needs this, to know which hashes a
    /// `delete_by_timeframe` call is about to affect before tombstoning
    /// runs, so it can enqueue one sync op per hash.
    pub fn live_hashes_in_timeframe(&self, start: f64, end: f64, tag: Option<&str>) -> CortexResult<Vec<String>> {
        self.pool.with_reader(|conn| memory_search::live_hashes_in_timeframe(conn, start, end, tag))
    }

    /// Whether `hash` names a tombstoned (not live, not absent) row. Lets
    /// the hybrid backend's initial sync pull skip a hash the local store
    /// has deliberately deleted, rather than resurrecting it the way a
    /// plain `store` call would.
    pub fn is_tombstoned(&self, hash: &str) -> CortexResult<bool> {
        self.pool.with_reader(|conn| {
            Ok(memory_crud::find_any_by_hash(conn, hash)?.map(|m| !m.is_live()).unwrap_or(false))
        })
    }

    // --- Sync-queue access (hybrid backend only; not part of `MemoryStore`).

    pub fn enqueue_sync_op(&self, hash: &str, op_type: OpType, payload: Option<&str>, now: f64) -> CortexResult<()> {
        self.pool.writer.with_conn_sync(|conn| sync_queue::enqueue(conn, hash, op_type, payload, now))
    }

    pub fn dequeue_sync_batch(&self, limit: usize) -> CortexResult<Vec<SyncOpRow>> {
        self.pool.writer.with_conn_sync(|conn| sync_queue::dequeue_batch(conn, limit))
    }

    pub fn remove_sync_op(&self, hash: &str) -> CortexResult<()> {
        self.pool.writer.with_conn_sync(|conn| sync_queue::remove(conn, hash))
    }

    /// Records a failed sync attempt; returns `true` if this push the op
    /// into the dead-letter state (attempts exhausted).
    pub fn record_sync_failure(&self, hash: &str, error: &str, max_attempts: i64) -> CortexResult<bool> {
        self.pool.writer.with_conn_sync(|conn| sync_queue::record_failure(conn, hash, error, max_attempts))
    }

    pub fn dead_letter_ops(&self) -> CortexResult<Vec<SyncOpRow>> {
        self.pool.with_reader(sync_queue::dead_letter_ops)
    }

    pub fn sync_queue_depth(&self) -> CortexResult<usize> {
        self.pool.with_reader(sync_queue::depth)
    }

    pub fn dead_letter_count(&self) -> CortexResult<usize> {
        self.pool.with_reader(sync_queue::dead_letter_count)
    }
}

impl MemoryStore for StorageEngine {
    fn store(&self, mut memory: Memory) -> CortexResult<String> {
        if memory.embedding.is_empty() {
            memory.embedding = self.embed(&memory.content)?;
        }
        let now = now();
        let model_name = self.embeddings.model_name().to_string();
        let hash = memory.content_hash.clone();

        self.pool.writer.with_savepoint("store_memory", |conn| {
            match dedup::check(conn, &memory, now, &self.dedup_config)? {
                DedupOutcome::New => {
                    memory_crud::insert_memory(conn, &memory)?;
                    vector_search::store_embedding(conn, &memory.content_hash, &memory.embedding, &model_name)?;
                }
                DedupOutcome::ExactDuplicate => {
                    return Err(CortexError::DuplicateExact { hash: hash.clone() });
                }
                DedupOutcome::SemanticDuplicate { existing_hash, similarity } => {
                    return Err(CortexError::DuplicateSemantic { existing_hash, similarity });
                }
                DedupOutcome::Resurrectable(mut existing) => {
                    existing.content = memory.content.clone();
                    existing.tags = memory.tags.clone();
                    existing.memory_type = memory.memory_type;
                    existing.metadata = memory.metadata.clone();
                    existing.embedding = memory.embedding.clone();
                    existing.resurrect(now);
                    memory_crud::replace_memory(conn, &existing)?;
                    vector_search::store_embedding(conn, &existing.content_hash, &existing.embedding, &model_name)?;
                }
            }
            Ok(())
        })?;
        Ok(hash)
    }

    fn update_metadata(&self, hash: &str, patch: MetadataPatch) -> CortexResult<bool> {
        let now = now();
        self.pool.writer.with_conn_sync(|conn| {
            let existing = match memory_crud::get_by_hash(conn, hash)? {
                Some(m) => m,
                None => return Ok(false),
            };
            let mut metadata = existing.metadata;
            metadata.merge(&patch.metadata);
            let metadata_json = serde_json::to_string(&metadata.0).unwrap_or_default();

            let tags_json = patch.tags.map(|t| serde_json::to_string(&normalize_tags(t)).unwrap_or_default());

            memory_crud::update_metadata_and_tags(conn, hash, &metadata_json, tags_json.as_deref(), now)
        })
    }

    fn delete(&self, hash: &str) -> CortexResult<bool> {
        let now = now();
        self.pool.writer.with_conn_sync(|conn| memory_crud::tombstone(conn, hash, now))
    }

    fn delete_by_tag(&self, tag: &str) -> CortexResult<usize> {
        let now = now();
        self.pool.writer.with_conn_sync(|conn| memory_search::delete_by_tag(conn, tag, now))
    }

    fn delete_by_tags(&self, tags: &[String], mode: TagMode) -> CortexResult<usize> {
        let now = now();
        let normalized = normalize_tags(tags.to_vec());
        self.pool
            .writer
            .with_conn_sync(|conn| memory_search::delete_by_tags(conn, &normalized, mode, now))
    }

    fn delete_by_timeframe(&self, start: f64, end: f64, tag: Option<&str>) -> CortexResult<usize> {
        let now = now();
        self.pool
            .writer
            .with_conn_sync(|conn| memory_search::delete_by_timeframe(conn, start, end, tag, now))
    }

    fn retrieve(&self, query_text: &str, k: usize) -> CortexResult<Vec<(Memory, f64)>> {
        let query_vector = self.embed(query_text)?;
        self.pool
            .with_reader(|conn| vector_search::top_k_by_similarity(conn, &query_vector, k, None, None))
    }

    fn search_by_tag(&self, tags: &[String], mode: TagMode) -> CortexResult<Vec<Memory>> {
        let normalized = normalize_tags(tags.to_vec());
        self.pool.with_reader(|conn| memory_search::search_by_tag(conn, &normalized, mode))
    }

    fn recall(&self, text: &str, start: Option<f64>, end: Option<f64>, k: usize) -> CortexResult<Vec<(Memory, f64)>> {
        let query_vector = self.embed(text)?;
        self.pool
            .with_reader(|conn| vector_search::top_k_by_similarity(conn, &query_vector, k, start, end))
    }

    fn exact_match(&self, substring: &str) -> CortexResult<Vec<Memory>> {
        self.pool.with_reader(|conn| memory_search::exact_match(conn, substring))
    }

    fn get_by_hash(&self, hash: &str) -> CortexResult<Option<Memory>> {
        self.pool.with_reader(|conn| {
            memory_crud::get_by_hash(conn, hash).map(|opt| opt.filter(Memory::is_live))
        })
    }

    fn find_connected(
        &self,
        hash: &str,
        depth: usize,
        rel_type: Option<RelationshipType>,
        direction: Direction,
    ) -> CortexResult<Vec<ConnectedNode>> {
        self.pool
            .with_reader(|conn| relationship_ops::find_connected(conn, hash, depth, rel_type, direction))
    }

    fn shortest_path(&self, a: &str, b: &str, rel_type: Option<RelationshipType>) -> CortexResult<Option<Vec<String>>> {
        self.pool.with_reader(|conn| relationship_ops::shortest_path(conn, a, b, rel_type))
    }

    fn get_subgraph(&self, hash: &str, radius: usize) -> CortexResult<Subgraph> {
        self.pool.with_reader(|conn| relationship_ops::get_subgraph(conn, hash, radius))
    }

    fn health_check(&self) -> CortexResult<HealthReport> {
        self.pool.with_reader(|conn| {
            Ok(HealthReport {
                backend: "local".to_string(),
                live_count: maintenance::live_count(conn)?,
                tombstone_count: maintenance::tombstone_count(conn)?,
                embedding_model: self.embeddings.model_name().to_string(),
                writable: true,
            })
        })
    }

    fn purge_tombstones(&self, older_than_days: i64) -> CortexResult<usize> {
        let cutoff = now() - (older_than_days as f64 * 86_400.0);
        let purged = self.pool.writer.with_conn_sync(|conn| maintenance::purge_tombstones(conn, cutoff))?;
        if purged > 0 {
            warn!(count = purged, "purged tombstoned memories past retention window");
        }
        Ok(purged)
    }

    fn add_relationship(&self, edge: GraphEdge) -> CortexResult<()> {
        self.pool.writer.with_conn_sync(|conn| relationship_ops::add_relationship(conn, &edge))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::{Memory, MemoryType, Metadata};

    fn engine() -> StorageEngine {
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(16));
        StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() }).unwrap()
    }

    #[test]
    fn store_then_retrieve_roundtrip() {
        let engine = engine();
        let m = Memory::new("rust ownership rules", "rust", MemoryType::Learning, Metadata::new(), 1.0, vec![]);
        let hash = engine.store(m).unwrap();
        let fetched = engine.get_by_hash(&hash).unwrap().unwrap();
        assert_eq!(fetched.content, "rust ownership rules");
    }

    #[test]
    fn duplicate_store_rejected() {
        let engine = engine();
        let m = Memory::new("same content", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        engine.store(m.clone()).unwrap();
        let err = engine.store(m).unwrap_err();
        assert!(matches!(err, CortexError::DuplicateExact { .. }));
    }

    #[test]
    fn delete_then_resurrect() {
        let engine = engine();
        let m = Memory::new("ephemeral note", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let hash = engine.store(m.clone()).unwrap();
        assert!(engine.delete(&hash).unwrap());
        assert!(engine.get_by_hash(&hash).unwrap().is_none());

        let resurrected_hash = engine.store(m).unwrap();
        assert_eq!(resurrected_hash, hash);
        assert!(engine.get_by_hash(&hash).unwrap().is_some());
    }

    #[test]
    fn consolidation_candidates_excludes_recent_and_tombstoned() {
        let engine = engine();
        let old = Memory::new("old memory", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let recent = Memory::new("recent memory", "t", MemoryType::Observation, Metadata::new(), 1_000_000.0, vec![]);
        let deleted = Memory::new("deleted memory", "t", MemoryType::Observation, Metadata::new(), 2.0, vec![]);
        engine.store(old).unwrap();
        engine.store(recent).unwrap();
        let deleted_hash = engine.store(deleted).unwrap();
        engine.delete(&deleted_hash).unwrap();

        let candidates = engine.consolidation_candidates(500_000.0, 100).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].content, "old memory");
    }

    #[test]
    fn connection_count_reflects_graph_edges() {
        let engine = engine();
        let a = Memory::new("a", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let b = Memory::new("b", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let hash_a = engine.store(a).unwrap();
        let hash_b = engine.store(b).unwrap();
        assert_eq!(engine.connection_count(&hash_a).unwrap(), 0);
        engine
            .add_relationship(GraphEdge {
                source_hash: hash_a.clone(),
                target_hash: hash_b,
                relationship_type: RelationshipType::Related,
                similarity: 0.5,
                metadata: Default::default(),
            })
            .unwrap();
        // `related` is symmetric: both (a,b) and (b,a) rows are stored, so
        // a's connection count reflects both.
        assert_eq!(engine.connection_count(&hash_a).unwrap(), 2);
    }

    #[test]
    fn health_check_reports_counts() {
        let engine = engine();
        let m = Memory::new("tracked", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        engine.store(m).unwrap();
        let report = engine.health_check().unwrap();
        assert_eq!(report.live_count, 1);
        assert_eq!(report.tombstone_count, 0);
    }
}
