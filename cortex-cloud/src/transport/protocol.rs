//! Versioned wire protocol for the cloud API. JSON envelopes so the remote
//! can evolve fields without breaking older clients.

use serde::{Deserialize, Serialize};

use cortex_core::memory::{Memory, Metadata};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudRequest<T: Serialize> {
    pub version: String,
    pub payload: T,
}

impl<T: Serialize> CloudRequest<T> {
    pub fn new(payload: T) -> Self {
        Self { version: PROTOCOL_VERSION.to_string(), payload }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudResponse<T> {
    pub version: String,
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

/// Wire representation of a `Memory`. A flat struct (rather than reusing
/// `Memory` directly) so the remote schema can diverge from the local one
/// without coupling the two — e.g. a remote field the local store has not
/// learned about yet round-trips through `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryPayload {
    pub content_hash: String,
    pub content: String,
    pub tags: Vec<String>,
    pub memory_type: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub created_at: f64,
    pub updated_at: f64,
    pub deleted_at: Option<f64>,
    pub embedding: Vec<f32>,
}

impl From<&Memory> for MemoryPayload {
    fn from(m: &Memory) -> Self {
        Self {
            content_hash: m.content_hash.clone(),
            content: m.content.clone(),
            tags: m.tags.clone(),
            memory_type: m.memory_type.as_str().to_string(),
            metadata: m.metadata.0.clone(),
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
            embedding: m.embedding.clone(),
        }
    }
}

impl From<MemoryPayload> for Memory {
    fn from(p: MemoryPayload) -> Self {
        Memory {
            content_hash: p.content_hash,
            content: p.content,
            tags: p.tags,
            memory_type: cortex_core::ontology::validate_type(&p.memory_type),
            metadata: Metadata(p.metadata),
            created_at: p.created_at,
            updated_at: p.updated_at,
            deleted_at: p.deleted_at,
            embedding: p.embedding,
        }
    }
}

