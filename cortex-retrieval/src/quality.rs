//! Quality Scorer: a composite of a model-based signal and implicit usage
//! signals, persisted into `metadata.quality_score` and a bounded
//! `metadata.ai_scores` history.
//!
//! A multi-factor weighted scorer collapsed down to exactly two factors —
//! no extra factors are reintroduced beyond what the composite defines.

use cortex_core::config::QualityConfig;
use cortex_core::constants::MAX_QUALITY_SCORE_HISTORY;
use cortex_core::errors::CortexResult;
use cortex_core::memory::Memory;
use cortex_core::traits::{MemoryStore, MetadataPatch};
use cortex_storage::queries::vector_search::cosine_similarity;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// `model_score(query, memory)`: a cross-encoder-style signal over
/// `(query, content)`. This system has no trained cross-encoder; the
/// embedding space stands in as the "model" — cosine similarity is
/// deterministic given the embedding provider's weights. Remapped from
/// `[-1, 1]` to `[0, 1]`.
fn model_score(query_embedding: &[f32], memory: &Memory) -> f64 {
    if query_embedding.is_empty() || memory.embedding.is_empty() {
        return 0.0;
    }
    let cos = cosine_similarity(query_embedding, &memory.embedding);
    ((cos + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// `frequency = log(1+access_count)/log(1+N)`.
fn frequency_term(memory: &Memory, corpus_size: usize) -> f64 {
    let n = corpus_size.max(1) as f64;
    let denom = (1.0 + n).ln();
    if denom <= 0.0 {
        return 0.0;
    }
    ((1.0 + memory.metadata.access_count() as f64).ln() / denom).clamp(0.0, 1.0)
}

/// `recency = exp(-age_days/30)`, aged off `created_at` like the decay
/// formula — a memory's implicit quality decays on the same clock as its
/// consolidation relevance.
fn recency_term(memory: &Memory, now: f64) -> f64 {
    let age_days = ((now - memory.created_at).max(0.0)) / SECONDS_PER_DAY;
    (-age_days / 30.0).exp().clamp(0.0, 1.0)
}

/// `ranking` — inverse average result position, clamped to `[0, 1]`.
/// Position 0 (top result) yields 1.0; positions further down the list
/// asymptotically approach 0. A memory never yet returned scores 0, not an
/// error — ranking is a usage signal, absence of usage is just "unranked".
fn ranking_term(memory: &Memory) -> f64 {
    let positions = memory.metadata.result_positions();
    if positions.is_empty() {
        return 0.0;
    }
    let avg = positions.iter().sum::<u64>() as f64 / positions.len() as f64;
    (1.0 / (1.0 + avg)).clamp(0.0, 1.0)
}

/// `implicit_score = 0.4*frequency + 0.3*recency + 0.3*ranking`.
pub fn implicit_score(memory: &Memory, corpus_size: usize, now: f64) -> f64 {
    (0.4 * frequency_term(memory, corpus_size) + 0.3 * recency_term(memory, now) + 0.3 * ranking_term(memory))
        .clamp(0.0, 1.0)
}

/// Composite `(1-w)*model + w*implicit`. Falls back to implicit-only when
/// either side has no embedding to compare — never fails the pipeline
/// because scoring failed.
pub fn composite_score(
    config: &QualityConfig,
    query_embedding: Option<&[f32]>,
    memory: &Memory,
    corpus_size: usize,
    now: f64,
) -> f64 {
    let implicit = implicit_score(memory, corpus_size, now);
    let model = match query_embedding {
        Some(q) if !q.is_empty() && !memory.embedding.is_empty() => Some(model_score(q, memory)),
        _ => None,
    };
    match model {
        Some(model) => {
            let w = config.effective_weight();
            (1.0 - w) * model + w * implicit
        }
        None => implicit,
    }
}

/// Scores and records a retrieval response. For every returned memory:
/// computes the composite score off its *pre-query* state, persists it
/// (`quality_score` + `ai_scores` ring buffer + `result_positions` ring
/// buffer), then bumps `access_count`/`last_accessed_at` — in that order,
/// so scoring always sees pre-query state. Scoring failures are logged and
/// skipped per-memory rather than propagated: a quality scorer that fails
/// must never empty out an otherwise-successful retrieval response.
pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn record_retrieval(
        &self,
        store: &dyn MemoryStore,
        query_embedding: Option<&[f32]>,
        results: &[(Memory, f64)],
        now: f64,
    ) -> CortexResult<()> {
        let corpus_size = store.health_check().map(|h| h.live_count).unwrap_or(1).max(1);

        for (position, (memory, _similarity)) in results.iter().enumerate() {
            let composite = composite_score(&self.config, query_embedding, memory, corpus_size, now);

            let mut metadata = memory.metadata.clone();
            metadata.set_quality_score(composite);
            metadata.push_ai_score(composite, MAX_QUALITY_SCORE_HISTORY);
            metadata.record_result_position(position, MAX_QUALITY_SCORE_HISTORY);
            metadata.set_access_count(metadata.access_count() + 1);
            metadata.set_last_accessed_at(now);

            if let Err(e) = store.update_metadata(&memory.content_hash, MetadataPatch::default().with_metadata(metadata)) {
                tracing::warn!(hash = %memory.content_hash, error = %e, "quality scorer failed to persist score, skipping");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::{MemoryType, Metadata};

    fn memory_with_access(access_count: u64, created_at: f64) -> Memory {
        let mut m = Memory::new("some content", "t", MemoryType::Observation, Metadata::new(), created_at, vec![0.1, 0.2, 0.3]);
        m.metadata.set_access_count(access_count);
        m
    }

    #[test]
    fn implicit_score_is_bounded() {
        let m = memory_with_access(1000, 0.0);
        let score = implicit_score(&m, 10, 1_000_000.0);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn more_frequently_accessed_memory_scores_higher() {
        let now = 1_000.0;
        let low = memory_with_access(0, now);
        let high = memory_with_access(500, now);
        assert!(implicit_score(&high, 1000, now) > implicit_score(&low, 1000, now));
    }

    #[test]
    fn stale_memory_scores_lower_on_recency() {
        let now = 1_000_000.0;
        let fresh = memory_with_access(0, now);
        let stale = memory_with_access(0, now - 365.0 * SECONDS_PER_DAY);
        assert!(implicit_score(&fresh, 10, now) > implicit_score(&stale, 10, now));
    }

    #[test]
    fn composite_falls_back_to_implicit_when_no_query_embedding() {
        let config = QualityConfig { boost_enabled: true, boost_weight: 0.3 };
        let m = memory_with_access(10, 1_000_000.0);
        let implicit = implicit_score(&m, 10, 1_000_000.0);
        let composite = composite_score(&config, None, &m, 10, 1_000_000.0);
        assert_eq!(composite, implicit);
    }

    #[test]
    fn composite_blends_model_and_implicit_when_boost_enabled() {
        let config = QualityConfig { boost_enabled: true, boost_weight: 0.3 };
        let m = memory_with_access(10, 1_000_000.0);
        let query_embedding = vec![0.1, 0.2, 0.3];
        let composite = composite_score(&config, Some(&query_embedding), &m, 10, 1_000_000.0);
        // identical query/memory embeddings => model_score is 1.0
        let implicit = implicit_score(&m, 10, 1_000_000.0);
        let expected = 0.7 * 1.0 + 0.3 * implicit;
        assert!((composite - expected).abs() < 1e-9);
    }

    #[test]
    fn boost_disabled_yields_model_only_weight_zero() {
        let config = QualityConfig { boost_enabled: false, boost_weight: 0.9 };
        assert_eq!(config.effective_weight(), 0.0);
    }

    #[test]
    fn ranking_term_prefers_top_positions() {
        let mut top = Memory::new("a", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let mut bottom = top.clone();
        top.metadata.record_result_position(0, 10);
        bottom.metadata.record_result_position(9, 10);
        assert!(ranking_term(&top) > ranking_term(&bottom));
    }

    #[test]
    fn never_ranked_memory_is_not_an_error() {
        let m = Memory::new("a", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        assert_eq!(ranking_term(&m), 0.0);
    }
}
