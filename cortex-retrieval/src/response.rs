//! Response-shaping contract: the `results` envelope every retrieval
//! endpoint returns, `max_response_chars` truncation at whole-memory
//! boundaries, and the `confirm_count` bulk-delete safety check.
//!
//! None of this talks to a store directly — these are pure shaping
//! functions the out-of-scope HTTP/tool-framing layers call after they
//! already have results in hand.

use serde::Serialize;
use serde_json::Map;

use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::Memory;

/// One memory as it appears in a `results` array. `similarity_score` is
/// only present for similarity-ranked responses (`retrieve`/`recall`), not
/// for tag/time/substring queries — `#[serde(skip_serializing_if)]` omits
/// the field entirely rather than serializing it as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryResult {
    pub content: String,
    pub content_hash: String,
    pub tags: Vec<String>,
    pub created_at: f64,
    pub updated_at: f64,
    pub metadata: Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
}

impl MemoryResult {
    pub fn from_memory(memory: &Memory, similarity_score: Option<f64>) -> Self {
        Self {
            content: memory.content.clone(),
            content_hash: memory.content_hash.clone(),
            tags: memory.tags.clone(),
            created_at: memory.created_at,
            updated_at: memory.updated_at,
            metadata: memory.metadata.0.clone(),
            similarity_score,
        }
    }
}

/// Build the `results` array from plain memories (tag/substring/time
/// queries — no similarity score).
pub fn results_from_memories(memories: &[Memory]) -> Vec<MemoryResult> {
    memories.iter().map(|m| MemoryResult::from_memory(m, None)).collect()
}

/// Build the `results` array from scored memories (`retrieve`/`recall`).
pub fn results_from_scored(scored: &[(Memory, f64)]) -> Vec<MemoryResult> {
    scored.iter().map(|(m, score)| MemoryResult::from_memory(m, Some(*score))).collect()
}

/// `{shown, total}` indicator accompanying a truncated response.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct TruncationIndicator {
    pub shown: usize,
    pub total: usize,
}

/// The full envelope returned by a retrieval endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ResultsEnvelope {
    pub results: Vec<MemoryResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<TruncationIndicator>,
}

/// Apply `max_response_chars`, truncating at whole-memory boundaries.
/// Budget is measured against each result's own serialized size so the
/// cut point tracks what actually ships. The first memory is always
/// included even if it alone exceeds the budget — at least one result is
/// returned whenever something matched, never a silently empty response.
pub fn shape_response(results: Vec<MemoryResult>, max_chars: Option<usize>) -> ResultsEnvelope {
    let total = results.len();
    let Some(budget) = max_chars else {
        return ResultsEnvelope { results, truncated: None };
    };
    if results.is_empty() {
        return ResultsEnvelope { results, truncated: None };
    }

    let mut shown = Vec::with_capacity(results.len());
    let mut used = 0usize;
    for (i, r) in results.into_iter().enumerate() {
        let size = serde_json::to_string(&r).map(|s| s.len()).unwrap_or(0);
        if i > 0 && used + size > budget {
            break;
        }
        used += size;
        shown.push(r);
    }

    let truncated =
        if shown.len() < total { Some(TruncationIndicator { shown: shown.len(), total }) } else { None };
    ResultsEnvelope { results: shown, truncated }
}

/// Bulk-delete safety: `confirm_count` must equal the count returned by a
/// prior `count` call, or the operation fails without side effects. Check
/// this *before* calling the actual delete — callers must not invoke the
/// store operation on a mismatch.
pub fn check_confirm_count(expected_count: usize, confirm_count: usize) -> CortexResult<()> {
    if confirm_count != expected_count {
        return Err(CortexError::ValidationError {
            reason: format!(
                "confirm_count mismatch: caller passed {confirm_count}, current count is {expected_count}"
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::{MemoryType, Metadata};

    fn memory(content: &str) -> Memory {
        Memory::new(content, "t", MemoryType::Observation, Metadata::new(), 1.0, vec![])
    }

    #[test]
    fn no_budget_means_no_truncation() {
        let results = results_from_memories(&[memory("a"), memory("b")]);
        let envelope = shape_response(results, None);
        assert_eq!(envelope.results.len(), 2);
        assert!(envelope.truncated.is_none());
    }

    #[test]
    fn tiny_budget_still_returns_one_memory() {
        let long_content = "x".repeat(10_000);
        let results = results_from_memories(&[memory(&long_content), memory("short")]);
        let envelope = shape_response(results, Some(1));
        assert_eq!(envelope.results.len(), 1);
        assert_eq!(envelope.truncated, Some(TruncationIndicator { shown: 1, total: 2 }));
    }

    #[test]
    fn budget_that_fits_everything_has_no_truncation_indicator() {
        let results = results_from_memories(&[memory("a"), memory("b"), memory("c")]);
        let envelope = shape_response(results, Some(10_000));
        assert_eq!(envelope.results.len(), 3);
        assert!(envelope.truncated.is_none());
    }

    #[test]
    fn empty_results_are_never_marked_truncated() {
        let envelope = shape_response(Vec::new(), Some(1));
        assert!(envelope.results.is_empty());
        assert!(envelope.truncated.is_none());
    }

    #[test]
    fn confirm_count_mismatch_fails() {
        let err = check_confirm_count(5, 4).unwrap_err();
        assert!(matches!(err, CortexError::ValidationError { .. }));
    }

    #[test]
    fn confirm_count_match_succeeds() {
        assert!(check_confirm_count(5, 5).is_ok());
    }

    #[test]
    fn similarity_score_is_omitted_for_tag_queries() {
        let results = results_from_memories(&[memory("a")]);
        let json = serde_json::to_string(&results[0]).unwrap();
        assert!(!json.contains("similarity_score"));
    }

    #[test]
    fn similarity_score_is_present_for_scored_queries() {
        let results = results_from_scored(&[(memory("a"), 0.9)]);
        let json = serde_json::to_string(&results[0]).unwrap();
        assert!(json.contains("similarity_score"));
    }
}
