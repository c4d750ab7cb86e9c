pub mod maintenance;
pub mod memory_crud;
pub mod memory_search;
pub mod relationship_ops;
pub mod sync_queue;
pub mod vector_search;
