//! `CloudStore` — the HTTP-backed cloud vector store (CVS). Implements the
//! same `MemoryStore` contract as the local store so the hybrid backend can
//! treat both uniformly.

use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::{Direction, GraphEdge, Memory, RelationshipType};
use cortex_core::traits::{ConnectedNode, HealthReport, MemoryStore, MetadataPatch, Subgraph, TagMode};

use crate::schema::ensure_schema;
use crate::transport::protocol::{CloudRequest, CloudResponse, MemoryPayload};
use crate::transport::{HttpClient, HttpClientConfig};

pub struct CloudStore {
    client: HttpClient,
}

impl CloudStore {
    /// Connect and run the lazy schema-migration check. Per §4.5, this must
    /// succeed (or exhaust its backoff) before the store is usable.
    pub fn connect(config: HttpClientConfig) -> CortexResult<Self> {
        let client = HttpClient::new(config);
        ensure_schema(&client)?;
        Ok(Self { client })
    }

    /// Build a client without the connect-time schema check. For test
    /// wiring only — production callers must go through [`Self::connect`]
    /// so a remote missing expected columns is caught before first use.
    pub fn connect_unchecked(config: HttpClientConfig) -> Self {
        Self { client: HttpClient::new(config) }
    }

    fn post<B: serde::Serialize, R: serde::de::DeserializeOwned>(&self, path: &str, body: B) -> CortexResult<R> {
        let envelope: CloudResponse<R> = self
            .client
            .post_json(path, &CloudRequest::new(body))
            .map_err(CortexError::Cloud)?;
        unwrap_envelope(envelope)
    }

    fn get<R: serde::de::DeserializeOwned>(&self, path: &str) -> CortexResult<R> {
        let envelope: CloudResponse<R> = self.client.get_json(path).map_err(CortexError::Cloud)?;
        unwrap_envelope(envelope)
    }

    /// Every live remote memory. Not part of `MemoryStore` — the bulk
    /// listing it needs has exactly one caller, the hybrid backend's
    /// initial-sync pull, so it is kept off the shared contract rather
    /// than speculatively generalized.
    pub fn export_live(&self) -> CortexResult<Vec<Memory>> {
        let payloads: Vec<MemoryPayload> = self.get("/memories/export")?;
        Ok(payloads.into_iter().map(Memory::from).collect())
    }
}

fn unwrap_envelope<R>(envelope: CloudResponse<R>) -> CortexResult<R> {
    if envelope.success {
        envelope.data.ok_or_else(|| CortexError::Storage(cortex_core::errors::StorageError::SqliteError {
            message: "cloud response marked successful but carried no data".to_string(),
        }))
    } else {
        Err(CortexError::ValidationError { reason: envelope.error.unwrap_or_default() })
    }
}

impl MemoryStore for CloudStore {
    fn store(&self, memory: Memory) -> CortexResult<String> {
        let payload = MemoryPayload::from(&memory);
        self.post("/memories", payload)
    }

    fn update_metadata(&self, hash: &str, patch: MetadataPatch) -> CortexResult<bool> {
        #[derive(serde::Serialize)]
        struct Body<'a> {
            hash: &'a str,
            metadata: &'a serde_json::Map<String, serde_json::Value>,
            tags: &'a Option<Vec<String>>,
        }
        self.post("/memories/update_metadata", Body { hash, metadata: &patch.metadata, tags: &patch.tags })
    }

    fn delete(&self, hash: &str) -> CortexResult<bool> {
        self.post("/memories/delete", serde_json::json!({ "hash": hash }))
    }

    fn delete_by_tag(&self, tag: &str) -> CortexResult<usize> {
        self.post("/memories/delete_by_tag", serde_json::json!({ "tag": tag }))
    }

    fn delete_by_tags(&self, tags: &[String], mode: TagMode) -> CortexResult<usize> {
        self.post(
            "/memories/delete_by_tags",
            serde_json::json!({ "tags": tags, "mode": tag_mode_str(mode) }),
        )
    }

    fn delete_by_timeframe(&self, start: f64, end: f64, tag: Option<&str>) -> CortexResult<usize> {
        self.post(
            "/memories/delete_by_timeframe",
            serde_json::json!({ "start": start, "end": end, "tag": tag }),
        )
    }

    fn retrieve(&self, query_text: &str, k: usize) -> CortexResult<Vec<(Memory, f64)>> {
        let scored: Vec<(MemoryPayload, f64)> =
            self.post("/memories/retrieve", serde_json::json!({ "query": query_text, "k": k }))?;
        Ok(scored.into_iter().map(|(p, s)| (Memory::from(p), s)).collect())
    }

    fn search_by_tag(&self, tags: &[String], mode: TagMode) -> CortexResult<Vec<Memory>> {
        let results: Vec<MemoryPayload> = self.post(
            "/memories/search_by_tag",
            serde_json::json!({ "tags": tags, "mode": tag_mode_str(mode) }),
        )?;
        Ok(results.into_iter().map(Memory::from).collect())
    }

    fn recall(&self, text: &str, start: Option<f64>, end: Option<f64>, k: usize) -> CortexResult<Vec<(Memory, f64)>> {
        let scored: Vec<(MemoryPayload, f64)> = self.post(
            "/memories/recall",
            serde_json::json!({ "text": text, "start": start, "end": end, "k": k }),
        )?;
        Ok(scored.into_iter().map(|(p, s)| (Memory::from(p), s)).collect())
    }

    fn exact_match(&self, substring: &str) -> CortexResult<Vec<Memory>> {
        let results: Vec<MemoryPayload> =
            self.post("/memories/exact_match", serde_json::json!({ "substring": substring }))?;
        Ok(results.into_iter().map(Memory::from).collect())
    }

    fn get_by_hash(&self, hash: &str) -> CortexResult<Option<Memory>> {
        let found: Option<MemoryPayload> = self.get(&format!("/memories/{hash}"))?;
        Ok(found.map(Memory::from))
    }

    fn find_connected(
        &self,
        hash: &str,
        depth: usize,
        rel_type: Option<RelationshipType>,
        direction: Direction,
    ) -> CortexResult<Vec<ConnectedNode>> {
        self.post(
            "/graph/connected",
            serde_json::json!({
                "hash": hash, "depth": depth,
                "rel_type": rel_type.map(relationship_type_str),
                "direction": direction_str(direction),
            }),
        )
    }

    fn shortest_path(&self, a: &str, b: &str, rel_type: Option<RelationshipType>) -> CortexResult<Option<Vec<String>>> {
        self.post(
            "/graph/shortest_path",
            serde_json::json!({ "a": a, "b": b, "rel_type": rel_type.map(relationship_type_str) }),
        )
    }

    fn get_subgraph(&self, hash: &str, radius: usize) -> CortexResult<Subgraph> {
        #[derive(serde::Deserialize)]
        struct Wire {
            nodes: Vec<MemoryPayload>,
            edges: Vec<GraphEdge>,
        }
        let wire: Wire = self.post("/graph/subgraph", serde_json::json!({ "hash": hash, "radius": radius }))?;
        Ok(Subgraph { nodes: wire.nodes.into_iter().map(Memory::from).collect(), edges: wire.edges })
    }

    fn health_check(&self) -> CortexResult<HealthReport> {
        self.get("/health")
    }

    fn purge_tombstones(&self, older_than_days: i64) -> CortexResult<usize> {
        self.post("/memories/purge_tombstones", serde_json::json!({ "older_than_days": older_than_days }))
    }

    fn add_relationship(&self, edge: GraphEdge) -> CortexResult<()> {
        self.post("/graph/edges", edge)
    }
}

fn tag_mode_str(mode: TagMode) -> &'static str {
    match mode {
        TagMode::Any => "any",
        TagMode::All => "all",
    }
}

fn direction_str(d: Direction) -> &'static str {
    match d {
        Direction::Out => "out",
        Direction::In => "in",
        Direction::Both => "both",
    }
}

fn relationship_type_str(r: RelationshipType) -> &'static str {
    match r {
        RelationshipType::Related => "related",
        RelationshipType::Contradicts => "contradicts",
        RelationshipType::Causes => "causes",
        RelationshipType::Fixes => "fixes",
        RelationshipType::Supports => "supports",
        RelationshipType::Opposes => "opposes",
        RelationshipType::Follows => "follows",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwrap_envelope_returns_data_on_success() {
        let envelope = CloudResponse { version: "1.0".to_string(), success: true, error: None, data: Some(42) };
        assert_eq!(unwrap_envelope(envelope).unwrap(), 42);
    }

    #[test]
    fn unwrap_envelope_errors_when_success_but_no_data() {
        let envelope: CloudResponse<i32> =
            CloudResponse { version: "1.0".to_string(), success: true, error: None, data: None };
        assert!(unwrap_envelope(envelope).is_err());
    }

    #[test]
    fn unwrap_envelope_surfaces_remote_error_message() {
        let envelope: CloudResponse<i32> =
            CloudResponse { version: "1.0".to_string(), success: false, error: Some("boom".to_string()), data: None };
        let err = unwrap_envelope(envelope).unwrap_err();
        match err {
            CortexError::ValidationError { reason } => assert_eq!(reason, "boom"),
            other => panic!("expected ValidationError, got {other:?}"),
        }
    }

    #[test]
    fn tag_mode_and_direction_and_relationship_strings_round_trip_expected_wire_values() {
        assert_eq!(tag_mode_str(TagMode::Any), "any");
        assert_eq!(tag_mode_str(TagMode::All), "all");
        assert_eq!(direction_str(Direction::Out), "out");
        assert_eq!(direction_str(Direction::In), "in");
        assert_eq!(direction_str(Direction::Both), "both");
        assert_eq!(relationship_type_str(RelationshipType::Related), "related");
        assert_eq!(relationship_type_str(RelationshipType::Follows), "follows");
    }
}
