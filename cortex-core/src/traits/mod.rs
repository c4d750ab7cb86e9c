mod embedding;
mod storage;

pub use embedding::EmbeddingProvider;
pub use storage::{
    ConnectedNode, HealthReport, MemoryStore, MetadataPatch, Subgraph, TagMode,
};
