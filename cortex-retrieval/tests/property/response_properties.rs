//! Property tests for the response-shaping contract's boundary behaviors:
//! truncation never exceeds the budget after the first memory, never
//! drops below one result when something matched, and never reports
//! `shown > total`.

use cortex_core::memory::{Memory, MemoryType, Metadata};
use cortex_retrieval::{results_from_memories, shape_response};
use proptest::prelude::*;

fn memory_of_len(n: usize) -> Memory {
    Memory::new("x".repeat(n.max(1)), "t", MemoryType::Observation, Metadata::new(), 1.0, vec![])
}

proptest! {
    #[test]
    fn shown_never_exceeds_total(lens in prop::collection::vec(1usize..200, 1..12), budget in 1usize..4000) {
        let memories: Vec<Memory> = lens.into_iter().map(memory_of_len).collect();
        let results = results_from_memories(&memories);
        let total = results.len();
        let envelope = shape_response(results, Some(budget));
        prop_assert!(envelope.results.len() <= total);
        prop_assert!(!envelope.results.is_empty());
    }

    #[test]
    fn at_least_one_result_whenever_something_matched(lens in prop::collection::vec(1usize..500, 1..8), budget in 1usize..20) {
        let memories: Vec<Memory> = lens.into_iter().map(memory_of_len).collect();
        let results = results_from_memories(&memories);
        let envelope = shape_response(results, Some(budget));
        prop_assert_eq!(envelope.results.len(), 1.max(envelope.results.len()));
        prop_assert!(!envelope.results.is_empty());
    }

    #[test]
    fn truncation_indicator_matches_actual_counts(lens in prop::collection::vec(1usize..200, 1..12), budget in 1usize..4000) {
        let memories: Vec<Memory> = lens.into_iter().map(memory_of_len).collect();
        let results = results_from_memories(&memories);
        let total = results.len();
        let envelope = shape_response(results, Some(budget));
        if let Some(indicator) = envelope.truncated {
            prop_assert_eq!(indicator.shown, envelope.results.len());
            prop_assert_eq!(indicator.total, total);
            prop_assert!(indicator.shown < indicator.total);
        } else {
            prop_assert_eq!(envelope.results.len(), total);
        }
    }

    #[test]
    fn no_budget_never_truncates(lens in prop::collection::vec(1usize..200, 0..12)) {
        let memories: Vec<Memory> = lens.into_iter().map(memory_of_len).collect();
        let total = memories.len();
        let results = results_from_memories(&memories);
        let envelope = shape_response(results, None);
        prop_assert_eq!(envelope.results.len(), total);
        prop_assert!(envelope.truncated.is_none());
    }
}
