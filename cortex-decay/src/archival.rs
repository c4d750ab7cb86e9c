//! Archival-eligibility check consumed by the consolidator's controlled
//! forgetting stage.

use cortex_core::memory::Memory;

use crate::formula::is_protected;

/// A memory is eligible for archival when its decayed relevance is below
/// `relevance_threshold`, its `last_accessed_at` is older than
/// `access_threshold_days`, and it carries no protected tag.
pub fn should_archive(memory: &Memory, relevance: f64, now: f64, relevance_threshold: f64, access_threshold_days: f64) -> bool {
    if is_protected(memory) {
        return false;
    }
    if relevance >= relevance_threshold {
        return false;
    }
    let last_accessed = memory.metadata.last_accessed_at().unwrap_or(memory.created_at);
    let idle_days = (now - last_accessed).max(0.0) / 86_400.0;
    idle_days >= access_threshold_days
}

#[cfg(test)]
mod tests {
    use cortex_core::memory::{Metadata, MemoryType};

    use super::*;

    fn memory_with_last_access(created_at: f64, last_accessed_at: Option<f64>, tags: &[&str]) -> Memory {
        let mut metadata = Metadata::new();
        if let Some(t) = last_accessed_at {
            metadata.set_last_accessed_at(t);
        }
        Memory::new(
            "content",
            tags.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            MemoryType::Observation,
            metadata,
            created_at,
            vec![],
        )
    }

    #[test]
    fn low_relevance_and_stale_access_is_archived() {
        let m = memory_with_last_access(0.0, Some(0.0), &[]);
        let now = 200.0 * 86_400.0;
        assert!(should_archive(&m, 0.05, now, 0.1, 90.0));
    }

    #[test]
    fn recently_accessed_memory_survives_despite_low_relevance() {
        let now = 200.0 * 86_400.0;
        let m = memory_with_last_access(0.0, Some(now - 86_400.0), &[]);
        assert!(!should_archive(&m, 0.05, now, 0.1, 90.0));
    }

    #[test]
    fn relevance_above_threshold_survives() {
        let now = 200.0 * 86_400.0;
        let m = memory_with_last_access(0.0, Some(0.0), &[]);
        assert!(!should_archive(&m, 0.5, now, 0.1, 90.0));
    }

    #[test]
    fn protected_tag_never_archived() {
        let now = 200.0 * 86_400.0;
        let m = memory_with_last_access(0.0, Some(0.0), &["important"]);
        assert!(!should_archive(&m, 0.0, now, 0.1, 90.0));
    }
}
