//! Content fingerprinting.
//!
//! `content_hash` must be a pure function of normalized content: same input
//! produces the same hash across platforms and crate versions, so it can
//! double as both the dedup key and the embedding cache key.

/// Normalize content for hashing: trim trailing whitespace and normalize
/// line endings to `\n`.
fn normalize(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n").trim_end().to_string()
}

/// Compute the stable content hash: a blake3 digest of normalized content,
/// encoded as lowercase hex.
pub fn content_hash(content: &str) -> String {
    let normalized = normalize(content);
    blake3::hash(normalized.as_bytes()).to_hex().to_string()
}
