//! Base/subtype taxonomy and relationship-type classification.
//!
//! Soft validation throughout: an unrecognized type never raises, it
//! coerces to a sane default. The taxonomy is a classifier, not a gate.

use crate::memory::{MemoryType, RelationshipType};

/// Validate (and coerce) a free-text memory type into one of the 5 base
/// types. Unknown tokens fall back to `Observation`.
pub fn validate_type(t: &str) -> MemoryType {
    match t.to_lowercase().as_str() {
        "observation" => MemoryType::Observation,
        "decision" => MemoryType::Decision,
        "learning" => MemoryType::Learning,
        "error" => MemoryType::Error,
        "pattern" => MemoryType::Pattern,
        _ => MemoryType::Observation,
    }
}

/// Maps legacy tokens from older schema versions onto the current 5-type
/// taxonomy. Called exactly once per record during schema migration.
pub fn migrate_legacy_type(t: &str) -> MemoryType {
    match t.to_lowercase().as_str() {
        "task" | "note" | "standard" | "fact" | "context" => MemoryType::Observation,
        "bug" | "failure" => MemoryType::Error,
        "rule" | "convention" => MemoryType::Pattern,
        "choice" => MemoryType::Decision,
        "lesson" => MemoryType::Learning,
        other => validate_type(other),
    }
}

/// `related` and `contradicts` are symmetric: both `(A,B)` and `(B,A)` rows
/// are stored. Everything else is asymmetric: a single directed row,
/// queried with a direction filter.
pub fn is_symmetric(rel: RelationshipType) -> bool {
    matches!(rel, RelationshipType::Related | RelationshipType::Contradicts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_type_coerces_to_observation() {
        assert_eq!(validate_type("bogus"), MemoryType::Observation);
    }

    #[test]
    fn known_types_round_trip() {
        for mt in MemoryType::ALL {
            assert_eq!(validate_type(mt.as_str()), mt);
        }
    }

    #[test]
    fn legacy_types_migrate() {
        assert_eq!(migrate_legacy_type("task"), MemoryType::Observation);
        assert_eq!(migrate_legacy_type("bug"), MemoryType::Error);
        assert_eq!(migrate_legacy_type("rule"), MemoryType::Pattern);
    }

    #[test]
    fn symmetric_classification() {
        assert!(is_symmetric(RelationshipType::Related));
        assert!(is_symmetric(RelationshipType::Contradicts));
        assert!(!is_symmetric(RelationshipType::Causes));
        assert!(!is_symmetric(RelationshipType::Fixes));
        assert!(!is_symmetric(RelationshipType::Supports));
        assert!(!is_symmetric(RelationshipType::Opposes));
        assert!(!is_symmetric(RelationshipType::Follows));
    }
}
