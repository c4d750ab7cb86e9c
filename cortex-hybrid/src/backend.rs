//! `HybridBackend` — local-first `MemoryStore` that queues every write for
//! background propagation to the cloud vector store (CVS).
//!
//! Every read is answered by the local store alone; the cloud side never
//! sits on the query path. Writes apply to the local store first and only
//! then enqueue a sync op — the background worker in [`crate::worker`] is
//! what actually talks to the cloud, on its own schedule.

use std::sync::Arc;

use cortex_cloud::transport::protocol::MemoryPayload;
use cortex_cloud::CloudStore;
use cortex_core::config::HybridSyncConfig;
use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::{Direction, GraphEdge, Memory, RelationshipType};
use cortex_core::traits::{ConnectedNode, HealthReport, MemoryStore, MetadataPatch, Subgraph, TagMode};
use cortex_storage::{StorageEngine, SyncOpType};

fn now() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Local-first store with a background cloud sync worker. Graph edges are
/// local-only for now — the sync queue has no edge op type, since cross-store
/// relationship propagation isn't part of this sync surface.
pub struct HybridBackend {
    pub(crate) local: Arc<StorageEngine>,
    pub(crate) cloud: Arc<CloudStore>,
    pub(crate) config: HybridSyncConfig,
}

impl HybridBackend {
    pub fn new(local: Arc<StorageEngine>, cloud: Arc<CloudStore>, config: HybridSyncConfig) -> Self {
        Self { local, cloud, config }
    }

    pub fn local(&self) -> &Arc<StorageEngine> {
        &self.local
    }

    pub fn cloud(&self) -> &Arc<CloudStore> {
        &self.cloud
    }

    pub fn config(&self) -> &HybridSyncConfig {
        &self.config
    }

    fn enqueue(&self, hash: &str, op: SyncOpType, memory: Option<&Memory>) -> CortexResult<()> {
        let payload = memory
            .map(|m| serde_json::to_string(&MemoryPayload::from(m)))
            .transpose()
            .map_err(|e| CortexError::ValidationError { reason: e.to_string() })?;
        self.local.enqueue_sync_op(hash, op, payload.as_deref(), now())
    }
}

impl MemoryStore for HybridBackend {
    fn store(&self, memory: Memory) -> CortexResult<String> {
        let hash = self.local.store(memory)?;
        // Re-read rather than re-serialize the caller's `Memory`: dedup may
        // have resurrected an existing row with a merged embedding/tags.
        if let Some(stored) = self.local.get_by_hash(&hash)? {
            self.enqueue(&hash, SyncOpType::Store, Some(&stored))?;
        }
        Ok(hash)
    }

    fn update_metadata(&self, hash: &str, patch: MetadataPatch) -> CortexResult<bool> {
        let updated = self.local.update_metadata(hash, patch)?;
        if updated {
            self.enqueue(hash, SyncOpType::Update, None)?;
        }
        Ok(updated)
    }

    fn delete(&self, hash: &str) -> CortexResult<bool> {
        let deleted = self.local.delete(hash)?;
        if deleted {
            self.enqueue(hash, SyncOpType::Delete, None)?;
        }
        Ok(deleted)
    }

    fn delete_by_tag(&self, tag: &str) -> CortexResult<usize> {
        let affected = self.local.search_by_tag(std::slice::from_ref(&tag.to_string()), TagMode::Any)?;
        let count = self.local.delete_by_tag(tag)?;
        for memory in affected {
            self.enqueue(&memory.content_hash, SyncOpType::Delete, None)?;
        }
        Ok(count)
    }

    fn delete_by_tags(&self, tags: &[String], mode: TagMode) -> CortexResult<usize> {
        let affected = self.local.search_by_tag(tags, mode)?;
        let count = self.local.delete_by_tags(tags, mode)?;
        for memory in affected {
            self.enqueue(&memory.content_hash, SyncOpType::Delete, None)?;
        }
        Ok(count)
    }

    fn delete_by_timeframe(&self, start: f64, end: f64, tag: Option<&str>) -> CortexResult<usize> {
        let affected = self.local.live_hashes_in_timeframe(start, end, tag)?;
        let count = self.local.delete_by_timeframe(start, end, tag)?;
        for hash in affected {
            self.enqueue(&hash, SyncOpType::Delete, None)?;
        }
        Ok(count)
    }

    fn retrieve(&self, query_text: &str, k: usize) -> CortexResult<Vec<(Memory, f64)>> {
        self.local.retrieve(query_text, k)
    }

    fn search_by_tag(&self, tags: &[String], mode: TagMode) -> CortexResult<Vec<Memory>> {
        self.local.search_by_tag(tags, mode)
    }

    fn recall(&self, text: &str, start: Option<f64>, end: Option<f64>, k: usize) -> CortexResult<Vec<(Memory, f64)>> {
        self.local.recall(text, start, end, k)
    }

    fn exact_match(&self, substring: &str) -> CortexResult<Vec<Memory>> {
        self.local.exact_match(substring)
    }

    fn get_by_hash(&self, hash: &str) -> CortexResult<Option<Memory>> {
        self.local.get_by_hash(hash)
    }

    fn find_connected(
        &self,
        hash: &str,
        depth: usize,
        rel_type: Option<RelationshipType>,
        direction: Direction,
    ) -> CortexResult<Vec<ConnectedNode>> {
        self.local.find_connected(hash, depth, rel_type, direction)
    }

    fn shortest_path(&self, a: &str, b: &str, rel_type: Option<RelationshipType>) -> CortexResult<Option<Vec<String>>> {
        self.local.shortest_path(a, b, rel_type)
    }

    fn get_subgraph(&self, hash: &str, radius: usize) -> CortexResult<Subgraph> {
        self.local.get_subgraph(hash, radius)
    }

    fn health_check(&self) -> CortexResult<HealthReport> {
        self.local.health_check()
    }

    fn purge_tombstones(&self, older_than_days: i64) -> CortexResult<usize> {
        let local_purged = self.local.purge_tombstones(older_than_days)?;
        let cloud_purged = self.cloud.purge_tombstones(older_than_days).unwrap_or(0);
        Ok(local_purged + cloud_purged)
    }

    fn add_relationship(&self, edge: GraphEdge) -> CortexResult<()> {
        self.local.add_relationship(edge)
    }
}
