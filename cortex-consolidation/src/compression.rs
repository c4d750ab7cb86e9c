//! Stage 4: semantic compression.
//!
//! Each cluster from stage 3 becomes one `pattern`-typed summary memory.
//! Originals are left untouched — compression adds a higher-level memory,
//! it doesn't replace the ones it was built from.

use cortex_core::constants::MAX_SUMMARY_CHARS;
use cortex_core::errors::CortexResult;
use cortex_core::memory::{Memory, MemoryType, Metadata};
use cortex_core::traits::MemoryStore;
use cortex_storage::StorageEngine;

use crate::clustering::Cluster;

/// Build and store one summary memory per cluster. Returns the content
/// hashes of the created summaries, in cluster order.
pub fn run(storage: &StorageEngine, candidates: &[Memory], clusters: &[Cluster], now: f64) -> CortexResult<Vec<String>> {
    let mut summaries = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let members: Vec<&Memory> = cluster.iter().map(|&i| &candidates[i]).collect();
        if members.is_empty() {
            continue;
        }
        summaries.push(store_summary(storage, &members, now)?);
    }
    Ok(summaries)
}

fn store_summary(storage: &StorageEngine, members: &[&Memory], now: f64) -> CortexResult<String> {
    let content = compress_content(members);

    let mut tags = Vec::new();
    for m in members {
        for t in &m.tags {
            if !tags.contains(t) {
                tags.push(t.clone());
            }
        }
    }

    let start = members.iter().map(|m| m.created_at).fold(f64::INFINITY, f64::min);
    let end = members.iter().map(|m| m.created_at).fold(f64::NEG_INFINITY, f64::max);

    let mut metadata = Metadata::new();
    let member_hashes: Vec<serde_json::Value> =
        members.iter().map(|m| serde_json::Value::from(m.content_hash.clone())).collect();
    metadata.0.insert("cluster_members".to_string(), serde_json::Value::Array(member_hashes));
    metadata.0.insert(
        "temporal_span".to_string(),
        serde_json::json!({ "start": start, "end": end, "span_days": (end - start) / 86_400.0 }),
    );

    let memory = Memory::new(content, tags, MemoryType::Pattern, metadata, now, vec![]);
    storage.store(memory)
}

/// Join member contents up to the character budget, truncating at a
/// member boundary rather than mid-sentence.
fn compress_content(members: &[&Memory]) -> String {
    let mut out = String::new();
    for m in members {
        let candidate = if out.is_empty() { m.content.clone() } else { format!("{out}; {}", m.content) };
        if candidate.len() > MAX_SUMMARY_CHARS {
            break;
        }
        out = candidate;
    }
    if out.is_empty() {
        out = members[0].content.chars().take(MAX_SUMMARY_CHARS).collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::config::DedupConfig;
    use cortex_embeddings::EmbeddingEngine;
    use std::sync::Arc;

    fn engine() -> StorageEngine {
        let embeddings = Arc::new(EmbeddingEngine::fallback_only(4));
        StorageEngine::open_in_memory(embeddings, DedupConfig { semantic_enabled: false, ..Default::default() }).unwrap()
    }

    fn memory(content: &str, tags: &str, created_at: f64) -> Memory {
        Memory::new(content, tags, MemoryType::Observation, Metadata::new(), created_at, vec![])
    }

    #[test]
    fn cluster_becomes_one_pattern_memory() {
        let engine = engine();
        let candidates = vec![
            memory("rust ownership basics", "rust", 100.0),
            memory("rust borrow checker rules", "rust,lang", 200.0),
        ];
        let clusters = vec![vec![0usize, 1usize]];
        let summaries = run(&engine, &candidates, &clusters, 300.0).unwrap();
        assert_eq!(summaries.len(), 1);

        let stored = engine.get_by_hash(&summaries[0]).unwrap().unwrap();
        assert_eq!(stored.memory_type, MemoryType::Pattern);
        assert!(stored.tags.contains(&"rust".to_string()));
        assert!(stored.tags.contains(&"lang".to_string()));
        let span = stored.metadata.0.get("temporal_span").unwrap();
        assert_eq!(span["start"], 100.0);
        assert_eq!(span["end"], 200.0);
    }

    #[test]
    fn empty_clusters_are_skipped() {
        let engine = engine();
        let candidates = vec![memory("solo", "t", 1.0)];
        let clusters: Vec<Cluster> = vec![vec![]];
        let summaries = run(&engine, &candidates, &clusters, 2.0).unwrap();
        assert!(summaries.is_empty());
    }

    #[test]
    fn summary_never_exceeds_the_character_budget() {
        let engine = engine();
        let long = "x".repeat(400);
        let candidates = vec![memory(&long, "t", 1.0), memory(&long, "t", 2.0), memory(&long, "t", 3.0)];
        let clusters = vec![vec![0usize, 1usize, 2usize]];
        let summaries = run(&engine, &candidates, &clusters, 4.0).unwrap();
        let stored = engine.get_by_hash(&summaries[0]).unwrap().unwrap();
        assert!(stored.content.len() <= MAX_SUMMARY_CHARS);
    }
}
