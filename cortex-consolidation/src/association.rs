//! Stage 2: creative association discovery.
//!
//! Random pair sampling over the horizon's candidates, keeping only pairs
//! whose cosine similarity lands in the "sweet spot" — similar enough to be
//! plausibly related, dissimilar enough that the connection isn't already
//! obvious from nearest-neighbor retrieval.

use rand::Rng;

use cortex_core::constants::ASSOCIATION_SWEET_SPOT;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{GraphEdge, Memory, RelationshipType};
use cortex_core::traits::MemoryStore;
use cortex_storage::queries::vector_search::cosine_similarity;
use cortex_storage::StorageEngine;

/// Keyword → relationship type used to classify a pair beyond the
/// symmetric `related` edge every kept pair gets. The first keyword found
/// in either memory's content wins.
const CLASSIFIERS: &[(&str, RelationshipType)] = &[
    ("because", RelationshipType::Causes),
    ("causes", RelationshipType::Causes),
    ("fixes", RelationshipType::Fixes),
    ("supports", RelationshipType::Supports),
    ("opposes", RelationshipType::Opposes),
];

fn classify(a: &Memory, b: &Memory) -> Option<RelationshipType> {
    let ca = a.content.to_lowercase();
    let cb = b.content.to_lowercase();
    CLASSIFIERS.iter().find(|(kw, _)| ca.contains(kw) || cb.contains(kw)).map(|(_, rel)| *rel)
}

/// Randomly samples pairs from `candidates`, writing a `related` edge (and,
/// when classifiable, one additional typed edge) for every pair whose
/// similarity lands in [`ASSOCIATION_SWEET_SPOT`]. Stops once `cap`
/// associations are discovered or sampling has been given a generous
/// number of attempts. Returns the count of pairs kept.
pub fn run(storage: &StorageEngine, candidates: &[Memory], cap: usize) -> CortexResult<usize> {
    if candidates.len() < 2 || cap == 0 {
        return Ok(0);
    }
    let mut rng = rand::thread_rng();
    let max_attempts = cap.saturating_mul(20).max(100);

    let mut discovered = 0;
    for _ in 0..max_attempts {
        if discovered >= cap {
            break;
        }
        let i = rng.gen_range(0..candidates.len());
        let j = rng.gen_range(0..candidates.len());
        if i == j {
            continue;
        }
        let a = &candidates[i];
        let b = &candidates[j];
        let similarity = cosine_similarity(&a.embedding, &b.embedding);
        if similarity < ASSOCIATION_SWEET_SPOT.0 || similarity > ASSOCIATION_SWEET_SPOT.1 {
            continue;
        }

        storage.add_relationship(GraphEdge {
            source_hash: a.content_hash.clone(),
            target_hash: b.content_hash.clone(),
            relationship_type: RelationshipType::Related,
            similarity,
            metadata: Default::default(),
        })?;

        if let Some(rel) = classify(a, b) {
            storage.add_relationship(GraphEdge {
                source_hash: a.content_hash.clone(),
                target_hash: b.content_hash.clone(),
                relationship_type: rel,
                similarity,
                metadata: Default::default(),
            })?;
        }

        discovered += 1;
    }

    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::config::DedupConfig;
    use cortex_core::memory::{MemoryType, Metadata};
    use cortex_embeddings::EmbeddingEngine;
    use std::sync::Arc;

    fn engine() -> StorageEngine {
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(4));
        StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() }).unwrap()
    }

    fn memory_with_embedding(content: &str, embedding: Vec<f32>) -> Memory {
        Memory::new(content, "t", MemoryType::Observation, Metadata::new(), 1.0, embedding)
    }

    #[test]
    fn fewer_than_two_candidates_discovers_nothing() {
        let engine = engine();
        let candidates = vec![memory_with_embedding("solo", vec![1.0, 0.0])];
        assert_eq!(run(&engine, &candidates, 10).unwrap(), 0);
    }

    #[test]
    fn sweet_spot_pair_yields_a_related_edge() {
        let engine = engine();
        // cosine_similarity([1,0],[0.5, 0.866]) = 0.5, inside [0.3, 0.7].
        let a = memory_with_embedding("first note", vec![1.0, 0.0]);
        let b = memory_with_embedding("second note", vec![0.5, 0.866]);
        let hash_a = a.content_hash.clone();
        let candidates = vec![a, b];
        let discovered = run(&engine, &candidates, 1).unwrap();
        assert_eq!(discovered, 1);
        // `related` is symmetric: both directions are stored, so a single
        // kept pair touches `a`'s connection count twice.
        assert_eq!(engine.connection_count(&hash_a).unwrap(), 2);
    }

    #[test]
    fn classifiable_pair_gets_a_second_typed_edge() {
        let engine = engine();
        let a = memory_with_embedding("the build failed because config was missing", vec![1.0, 0.0]);
        let b = memory_with_embedding("unrelated follow up note", vec![0.5, 0.866]);
        let hash_a = a.content_hash.clone();
        let candidates = vec![a, b];
        run(&engine, &candidates, 1).unwrap();
        // 2 rows from the symmetric `related` edge, 1 more from the
        // asymmetric `causes` edge with `a` as source.
        assert_eq!(engine.connection_count(&hash_a).unwrap(), 3);
    }

    #[test]
    fn identical_embeddings_are_never_kept() {
        let engine = engine();
        let a = memory_with_embedding("a", vec![1.0, 0.0]);
        let b = memory_with_embedding("b", vec![1.0, 0.0]);
        let hash_a = a.content_hash.clone();
        let candidates = vec![a, b];
        run(&engine, &candidates, 5).unwrap();
        assert_eq!(engine.connection_count(&hash_a).unwrap(), 0);
    }
}
