use serde::{Deserialize, Serialize};

/// Association/graph-edge relationship types.
///
/// `Related` and `Contradicts` are symmetric (stored both directions);
/// the rest are asymmetric (stored once, queried by direction). See
/// [`crate::ontology::is_symmetric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Related,
    Contradicts,
    Causes,
    Fixes,
    Supports,
    Opposes,
    Follows,
}

impl RelationshipType {
    pub const ALL: [RelationshipType; 7] = [
        RelationshipType::Related,
        RelationshipType::Contradicts,
        RelationshipType::Causes,
        RelationshipType::Fixes,
        RelationshipType::Supports,
        RelationshipType::Opposes,
        RelationshipType::Follows,
    ];
}

/// Direction filter for asymmetric relationship traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Edges where the queried hash is the source.
    Out,
    /// Edges where the queried hash is the target.
    In,
    /// Both directions.
    Both,
}

/// An edge in the association graph between two memories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source_hash: String,
    pub target_hash: String,
    pub relationship_type: RelationshipType,
    /// Cosine similarity (or other strength signal) backing this edge, 0.0-1.0.
    pub similarity: f64,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
