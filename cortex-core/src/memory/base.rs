use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use super::types::MemoryType;
use crate::hash::content_hash;
use crate::tags::{normalize_tags, TagSource};

/// The universal memory record. Every row in the local or cloud store is a
/// `Memory`. `content_hash` is a pure function of normalized `content` and
/// acts as the primary key (see [`crate::hash::content_hash`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub content_hash: String,
    pub content: String,
    pub tags: Vec<String>,
    pub memory_type: MemoryType,
    pub metadata: Metadata,
    /// Float seconds since epoch, UTC.
    pub created_at: f64,
    /// Float seconds since epoch, UTC.
    pub updated_at: f64,
    /// Set when this record is a tombstone. `None` means live.
    pub deleted_at: Option<f64>,
    pub embedding: Vec<f32>,
}

impl Memory {
    /// Build a new live memory from caller-supplied fields. `content_hash`
    /// is derived, never taken from the caller.
    pub fn new(
        content: impl Into<String>,
        tags: impl TagSource,
        memory_type: MemoryType,
        metadata: Metadata,
        now: f64,
        embedding: Vec<f32>,
    ) -> Self {
        let content = content.into();
        let hash = content_hash(&content);
        Self {
            content_hash: hash,
            content,
            tags: normalize_tags(tags),
            memory_type,
            metadata,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            embedding,
        }
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn is_tombstone(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete in place.
    pub fn tombstone(&mut self, now: f64) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Resurrect a tombstone back to a live row with fresh timestamps.
    /// Distinct from a duplicate failure: the hash matches a dead row, not
    /// a live one.
    pub fn resurrect(&mut self, now: f64) {
        self.deleted_at = None;
        self.created_at = now;
        self.updated_at = now;
    }
}
