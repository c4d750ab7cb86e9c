//! # cortex-core
//!
//! Foundation crate for the Cortex memory system.
//! Defines the memory model, ontology, hash/tag utilities, errors, config,
//! and the storage-capability traits every backend implements.

pub mod config;
pub mod constants;
pub mod errors;
pub mod hash;
pub mod memory;
pub mod ontology;
pub mod tags;
pub mod traits;

pub use config::CortexConfig;
pub use errors::{CortexError, CortexResult};
pub use memory::{GraphEdge, Memory, MemoryType, RelationshipType};
