//! Wire compatibility (§6): memories exported from one device must import
//! cleanly on another, preserving every §3 field including `deleted_at`
//! and full metadata. Two envelope shapes exist in the wild — a
//! dashboard export keyed by `export_date`, a CLI export keyed by
//! `export_metadata` — and the importer normalizes both to one internal
//! shape before any memory in the payload is touched.

use serde::Serialize;
use serde_json::{Map, Value};

use cortex_core::errors::{CortexError, CortexResult};
use cortex_core::memory::Memory;

/// Which envelope shape a payload arrived in, kept only for diagnostics —
/// nothing downstream branches on it once normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    Dashboard,
    Cli,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct NormalizedImport {
    pub source: ExportSource,
    pub memories: Vec<Memory>,
}

/// Accept either envelope shape and normalize to one internal shape.
/// Unrecognized envelope keys are tolerated (`source` becomes `Unknown`)
/// as long as a `memories` array is present — only a missing `memories`
/// array is a hard validation failure.
pub fn normalize_import(raw: &Value) -> CortexResult<NormalizedImport> {
    let obj = raw.as_object().ok_or_else(|| CortexError::ValidationError {
        reason: "import envelope must be a JSON object".to_string(),
    })?;

    let source = if obj.contains_key("export_date") {
        ExportSource::Dashboard
    } else if obj.contains_key("export_metadata") {
        ExportSource::Cli
    } else {
        ExportSource::Unknown
    };

    let memories_value = obj.get("memories").ok_or_else(|| CortexError::ValidationError {
        reason: "import envelope missing `memories` array".to_string(),
    })?;

    let memories: Vec<Memory> = serde_json::from_value(memories_value.clone())
        .map_err(|e| CortexError::ValidationError { reason: format!("malformed memory in import payload: {e}") })?;

    Ok(NormalizedImport { source, memories })
}

/// Canonical export shape (dashboard-style, `export_date`-keyed) — the one
/// this system emits. Both shapes are accepted on import; only this one is
/// produced on export, rather than perpetuating the CLI's legacy envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ExportEnvelope {
    pub export_date: String,
    pub memory_count: usize,
    pub memories: Vec<Memory>,
}

/// `exported_at` is epoch seconds; formatted as an RFC 3339 UTC timestamp
/// to match what a human-facing dashboard export would show.
pub fn build_export(memories: Vec<Memory>, exported_at: f64) -> ExportEnvelope {
    let export_date = chrono::DateTime::<chrono::Utc>::from_timestamp(exported_at as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();
    ExportEnvelope { memory_count: memories.len(), export_date, memories }
}

/// Metadata map shape used by both envelope flavors' `export_metadata`
/// field, when present — exposed so callers parsing a raw CLI envelope can
/// inspect it without re-implementing the object walk.
pub fn cli_export_metadata(raw: &Value) -> Option<&Map<String, Value>> {
    raw.get("export_metadata").and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortex_core::memory::{MemoryType, Metadata};

    fn sample_memory_json() -> Value {
        let m = Memory::new("exported content", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![0.1]);
        serde_json::to_value(&m).unwrap()
    }

    #[test]
    fn dashboard_envelope_normalizes() {
        let raw = serde_json::json!({
            "export_date": "2026-01-01T00:00:00Z",
            "memories": [sample_memory_json()],
        });
        let normalized = normalize_import(&raw).unwrap();
        assert_eq!(normalized.source, ExportSource::Dashboard);
        assert_eq!(normalized.memories.len(), 1);
        assert_eq!(normalized.memories[0].content, "exported content");
    }

    #[test]
    fn cli_envelope_normalizes() {
        let raw = serde_json::json!({
            "export_metadata": {"tool_version": "1.0"},
            "memories": [sample_memory_json()],
        });
        let normalized = normalize_import(&raw).unwrap();
        assert_eq!(normalized.source, ExportSource::Cli);
        assert_eq!(normalized.memories.len(), 1);
    }

    #[test]
    fn deleted_at_survives_round_trip() {
        let mut m = Memory::new("tombstoned", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        m.tombstone(2.0);
        let raw = serde_json::json!({"export_date": "x", "memories": [m]});
        let normalized = normalize_import(&raw).unwrap();
        assert_eq!(normalized.memories[0].deleted_at, Some(2.0));
    }

    #[test]
    fn missing_memories_array_is_a_validation_error() {
        let raw = serde_json::json!({"export_date": "x"});
        let err = normalize_import(&raw).unwrap_err();
        assert!(matches!(err, CortexError::ValidationError { .. }));
    }

    #[test]
    fn unrecognized_envelope_still_imports_with_unknown_source() {
        let raw = serde_json::json!({"memories": [sample_memory_json()]});
        let normalized = normalize_import(&raw).unwrap();
        assert_eq!(normalized.source, ExportSource::Unknown);
    }

    #[test]
    fn build_export_produces_dashboard_style_envelope() {
        let m = Memory::new("a", "t", MemoryType::Observation, Metadata::new(), 1.0, vec![]);
        let envelope = build_export(vec![m], 1_700_000_000.0);
        assert_eq!(envelope.memory_count, 1);
        assert!(!envelope.export_date.is_empty());
    }
}
