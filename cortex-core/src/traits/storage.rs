use serde::{Deserialize, Serialize};
use serde_json::Map;

use crate::errors::CortexResult;
use crate::memory::{Direction, GraphEdge, Memory, Metadata, RelationshipType};

/// `all`: every tag must be present. `any`: at least one tag present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    Any,
    All,
}

/// Partial update applied by `update_metadata`: merges into existing
/// metadata, optionally replaces the tag set.
#[derive(Debug, Clone, Default)]
pub struct MetadataPatch {
    pub metadata: Map<String, serde_json::Value>,
    pub tags: Option<Vec<String>>,
}

/// A hash reachable from a traversal root, with its graph distance.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectedNode {
    pub content_hash: String,
    pub distance: usize,
}

/// Nodes + edges around a root hash within `radius` hops.
#[derive(Debug, Clone, Default)]
pub struct Subgraph {
    pub nodes: Vec<Memory>,
    pub edges: Vec<GraphEdge>,
}

/// `health_check()` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub backend: String,
    pub live_count: usize,
    pub tombstone_count: usize,
    pub embedding_model: String,
    pub writable: bool,
}

/// The full storage-capability contract (§4.4). Implemented once each by
/// the local vector store, the cloud vector store, and the hybrid backend
/// that composes them — callers never see which is which.
pub trait MemoryStore: Send + Sync {
    /// Insert a new memory. Exact-hash duplicates and (if enabled)
    /// semantic duplicates fail with the corresponding `CortexError`
    /// variant; a hash matching an existing tombstone resurrects it.
    fn store(&self, memory: Memory) -> CortexResult<String>;

    fn update_metadata(&self, hash: &str, patch: MetadataPatch) -> CortexResult<bool>;

    /// Soft-delete. A missing hash returns `Ok(false)`, never an error.
    fn delete(&self, hash: &str) -> CortexResult<bool>;

    fn delete_by_tag(&self, tag: &str) -> CortexResult<usize>;

    fn delete_by_tags(&self, tags: &[String], mode: TagMode) -> CortexResult<usize>;

    fn delete_by_timeframe(
        &self,
        start: f64,
        end: f64,
        tag: Option<&str>,
    ) -> CortexResult<usize>;

    /// Top-k semantic retrieval, ordered by cosine similarity descending.
    fn retrieve(&self, query_text: &str, k: usize) -> CortexResult<Vec<(Memory, f64)>>;

    /// Ordered by `created_at` descending.
    fn search_by_tag(&self, tags: &[String], mode: TagMode) -> CortexResult<Vec<Memory>>;

    fn recall(
        &self,
        text: &str,
        start: Option<f64>,
        end: Option<f64>,
        k: usize,
    ) -> CortexResult<Vec<(Memory, f64)>>;

    /// Case-insensitive substring match, ordered by `created_at` descending.
    fn exact_match(&self, substring: &str) -> CortexResult<Vec<Memory>>;

    fn get_by_hash(&self, hash: &str) -> CortexResult<Option<Memory>>;

    fn find_connected(
        &self,
        hash: &str,
        depth: usize,
        rel_type: Option<RelationshipType>,
        direction: Direction,
    ) -> CortexResult<Vec<ConnectedNode>>;

    fn shortest_path(
        &self,
        a: &str,
        b: &str,
        rel_type: Option<RelationshipType>,
    ) -> CortexResult<Option<Vec<String>>>;

    fn get_subgraph(&self, hash: &str, radius: usize) -> CortexResult<Subgraph>;

    fn health_check(&self) -> CortexResult<HealthReport>;

    fn purge_tombstones(&self, older_than_days: i64) -> CortexResult<usize>;

    // --- Graph edge mutation (Consolidator / explicit relationship API). ---
    fn add_relationship(&self, edge: GraphEdge) -> CortexResult<()>;
}

/// Accessor helpers shared by metadata-patch builders.
impl MetadataPatch {
    pub fn with_metadata(mut self, m: Metadata) -> Self {
        self.metadata = m.0;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }
}
