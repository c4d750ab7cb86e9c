//! Typed accessors over the free-form metadata map.
//!
//! Known keys (`quality_score`, `access_count`, ...) get typed getters and
//! setters; anything else passes through untouched for forward
//! compatibility with callers that stash their own keys.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Metadata(pub Map<String, Value>);

macro_rules! f64_field {
    ($get:ident, $set:ident, $key:expr) => {
        pub fn $get(&self) -> Option<f64> {
            self.0.get($key).and_then(Value::as_f64)
        }

        pub fn $set(&mut self, v: f64) {
            self.0.insert($key.to_string(), Value::from(v));
        }
    };
}

macro_rules! str_field {
    ($get:ident, $set:ident, $key:expr) => {
        pub fn $get(&self) -> Option<&str> {
            self.0.get($key).and_then(Value::as_str)
        }

        pub fn $set(&mut self, v: impl Into<String>) {
            self.0.insert($key.to_string(), Value::from(v.into()));
        }
    };
}

impl Metadata {
    pub fn new() -> Self {
        Self(Map::new())
    }

    f64_field!(quality_score, set_quality_score, "quality_score");
    f64_field!(emotional_valence, set_emotional_valence, "emotional_valence");
    f64_field!(emotional_arousal, set_emotional_arousal, "emotional_arousal");
    f64_field!(credibility, set_credibility, "credibility");

    str_field!(episode_id, set_episode_id, "episode_id");
    str_field!(preceding_memory_id, set_preceding_memory_id, "preceding_memory_id");
    str_field!(source_type, set_source_type, "source_type");

    pub fn access_count(&self) -> u64 {
        self.0.get("access_count").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn set_access_count(&mut self, v: u64) {
        self.0.insert("access_count".to_string(), Value::from(v));
    }

    pub fn last_accessed_at(&self) -> Option<f64> {
        self.0.get("last_accessed_at").and_then(Value::as_f64)
    }

    pub fn set_last_accessed_at(&mut self, v: f64) {
        self.0.insert("last_accessed_at".to_string(), Value::from(v));
    }

    pub fn sequence_number(&self) -> Option<i64> {
        self.0.get("sequence_number").and_then(Value::as_i64)
    }

    pub fn set_sequence_number(&mut self, v: i64) {
        self.0.insert("sequence_number".to_string(), Value::from(v));
    }

    /// Ring-buffer of historical composite quality scores (last N entries).
    pub fn ai_scores(&self) -> Vec<f64> {
        self.0
            .get("ai_scores")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default()
    }

    /// Push a new score onto the `ai_scores` ring buffer, keeping at most
    /// `max_len` entries (oldest dropped first).
    pub fn push_ai_score(&mut self, score: f64, max_len: usize) {
        let mut scores = self.ai_scores();
        scores.push(score);
        if scores.len() > max_len {
            let drop = scores.len() - max_len;
            scores.drain(0..drop);
        }
        let arr = scores.into_iter().map(Value::from).collect();
        self.0.insert("ai_scores".to_string(), Value::Array(arr));
    }

    /// Ring-buffer of recent result positions (0-indexed rank within a
    /// retrieval response) this memory was returned at, backing the quality
    /// scorer's `ranking` implicit-signal term.
    pub fn result_positions(&self) -> Vec<u64> {
        self.0
            .get("result_positions")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_u64).collect())
            .unwrap_or_default()
    }

    /// Push a new observed result position onto the ring buffer, keeping at
    /// most `max_len` entries (oldest dropped first).
    pub fn record_result_position(&mut self, position: usize, max_len: usize) {
        let mut positions = self.result_positions();
        positions.push(position as u64);
        if positions.len() > max_len {
            let drop = positions.len() - max_len;
            positions.drain(0..drop);
        }
        let arr = positions.into_iter().map(Value::from).collect();
        self.0.insert("result_positions".to_string(), Value::Array(arr));
    }

    /// Merge a partial metadata patch in, known keys validated by callers
    /// that need to (e.g. clamping emotional_valence to [-1,1]).
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            self.0.insert(k.clone(), v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_scores_ring_buffer_bounds() {
        let mut m = Metadata::new();
        for i in 0..15 {
            m.push_ai_score(i as f64, 10);
        }
        let scores = m.ai_scores();
        assert_eq!(scores.len(), 10);
        assert_eq!(scores[0], 5.0);
        assert_eq!(scores[9], 14.0);
    }

    #[test]
    fn result_position_ring_buffer_bounds() {
        let mut m = Metadata::new();
        for i in 0..15 {
            m.record_result_position(i, 10);
        }
        let positions = m.result_positions();
        assert_eq!(positions.len(), 10);
        assert_eq!(positions[0], 5);
        assert_eq!(positions[9], 14);
    }

    #[test]
    fn unknown_keys_pass_through() {
        let mut m = Metadata::new();
        m.0.insert("custom_key".to_string(), Value::from("custom_value"));
        assert_eq!(m.0.get("custom_key").and_then(Value::as_str), Some("custom_value"));
    }
}
