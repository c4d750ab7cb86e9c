//! Lazy schema migration on first connect: if the remote is missing
//! expected columns, request a migration and retry with backoff until the
//! remote metadata settles.

use std::thread::sleep;
use std::time::Duration;

use serde::Deserialize;

use cortex_core::errors::{CloudError, CortexError, CortexResult};

use crate::transport::HttpClient;

const EXPECTED_COLUMNS: &[&str] = &["content_hash", "content", "tags", "deleted_at", "metadata"];
const MAX_MIGRATION_ATTEMPTS: u32 = 5;

#[derive(Debug, Deserialize)]
struct SchemaStatus {
    columns: Vec<String>,
}

pub fn ensure_schema(client: &HttpClient) -> CortexResult<()> {
    let mut last_error = None;

    for attempt in 0..MAX_MIGRATION_ATTEMPTS {
        let status: SchemaStatus = match client.get_json("/schema/status") {
            Ok(s) => s,
            Err(e) if e.is_transient() => {
                last_error = Some(e);
                backoff(attempt);
                continue;
            }
            Err(e) => return Err(CortexError::Cloud(e)),
        };

        let missing = missing_columns(&status.columns);

        if missing.is_empty() {
            return Ok(());
        }

        tracing::warn!(?missing, attempt, "remote schema missing columns, requesting migration");
        match client.post_json::<_, serde_json::Value>(
            "/schema/migrate",
            &serde_json::json!({ "add_columns": missing }),
        ) {
            Ok(_) => {}
            Err(e) if e.is_transient() => last_error = Some(e),
            Err(e) => return Err(CortexError::Cloud(e)),
        }

        backoff(attempt);
    }

    Err(CortexError::Cloud(CloudError::SchemaRefused {
        reason: last_error.map(|e| e.to_string()).unwrap_or_else(|| "schema never settled".to_string()),
    }))
}

fn missing_columns(present: &[String]) -> Vec<&'static str> {
    EXPECTED_COLUMNS.iter().copied().filter(|c| !present.iter().any(|existing| existing == c)).collect()
}

fn backoff(attempt: u32) {
    sleep(Duration::from_millis(200 * 2u64.pow(attempt)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_detects_gaps() {
        let present = vec!["content_hash".to_string(), "content".to_string()];
        let missing = missing_columns(&present);
        assert_eq!(missing, vec!["tags", "deleted_at", "metadata"]);
    }

    #[test]
    fn missing_columns_empty_when_complete() {
        let present: Vec<String> = EXPECTED_COLUMNS.iter().map(|s| s.to_string()).collect();
        assert!(missing_columns(&present).is_empty());
    }
}
