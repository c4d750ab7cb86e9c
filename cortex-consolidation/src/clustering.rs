//! Stage 3: semantic clustering.
//!
//! DBSCAN-style density clustering over the horizon's candidate embeddings.
//! Noise points (negative label) are left alone — they simply don't appear
//! in any cluster's member list, and stage 4 never sees them.

use std::collections::HashMap;

use hdbscan::{Hdbscan, HdbscanHyperParams};

use cortex_core::memory::Memory;

/// Indices into the candidate slice that make up one cluster.
pub type Cluster = Vec<usize>;

/// Cluster `candidates` by embedding. Returns clusters sorted largest
/// first; callers index back into `candidates` with the returned indices.
/// Below `min_cluster_size` candidates, clustering is skipped entirely —
/// HDBSCAN has nothing meaningful to find.
pub fn run(candidates: &[Memory], min_cluster_size: usize) -> Vec<Cluster> {
    if candidates.len() < min_cluster_size {
        return Vec::new();
    }

    let features: Vec<Vec<f32>> = candidates.iter().map(|m| m.embedding.clone()).collect();
    let hyper_params = HdbscanHyperParams::builder().min_cluster_size(min_cluster_size).min_samples(1).build();
    let clusterer = Hdbscan::new(&features, hyper_params);

    let labels = match clusterer.cluster() {
        Ok(l) => l,
        Err(_) => return Vec::new(),
    };

    let mut by_label: HashMap<i32, Cluster> = HashMap::new();
    for (idx, label) in labels.into_iter().enumerate() {
        if label >= 0 {
            by_label.entry(label).or_default().push(idx);
        }
    }

    let mut clusters: Vec<Cluster> = by_label.into_values().collect();
    clusters.sort_by_key(|c| std::cmp::Reverse(c.len()));
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::{MemoryType, Metadata};

    fn memory_with_embedding(embedding: Vec<f32>) -> Memory {
        Memory::new("content", "t", MemoryType::Observation, Metadata::new(), 1.0, embedding)
    }

    #[test]
    fn too_few_candidates_yields_no_clusters() {
        let candidates = vec![memory_with_embedding(vec![1.0, 0.0])];
        assert!(run(&candidates, 5).is_empty());
    }

    #[test]
    fn tight_group_is_fully_accounted_for() {
        let candidates: Vec<Memory> =
            (0..6).map(|i| memory_with_embedding(vec![1.0, 1.0 + i as f32 * 0.001])).collect();
        let clusters = run(&candidates, 5);
        let total: usize = clusters.iter().map(|c| c.len()).sum();
        assert!(total <= 6);
    }
}
