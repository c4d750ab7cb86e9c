pub mod base;
pub mod metadata;
pub mod relationships;
pub mod types;

pub use base::Memory;
pub use metadata::Metadata;
pub use relationships::{Direction, GraphEdge, RelationshipType};
pub use types::MemoryType;
