//! Tag normalization.
//!
//! Tags arrive from heterogeneous callers: a single comma-separated string
//! (CLI/dashboard style), a JSON array (API style), or nothing at all. The
//! ontology treats all three the same way once normalized.

use serde_json::Value;

/// Anything that can be turned into a raw tag list before normalization.
pub trait TagSource {
    fn into_raw_tags(self) -> Vec<String>;
}

impl TagSource for &str {
    fn into_raw_tags(self) -> Vec<String> {
        self.split(',').map(|s| s.to_string()).collect()
    }
}

impl TagSource for String {
    fn into_raw_tags(self) -> Vec<String> {
        self.as_str().into_raw_tags()
    }
}

impl TagSource for &[String] {
    fn into_raw_tags(self) -> Vec<String> {
        self.to_vec()
    }
}

impl TagSource for Vec<String> {
    fn into_raw_tags(self) -> Vec<String> {
        self
    }
}

impl<T: TagSource> TagSource for Option<T> {
    fn into_raw_tags(self) -> Vec<String> {
        self.map(TagSource::into_raw_tags).unwrap_or_default()
    }
}

impl TagSource for &Value {
    fn into_raw_tags(self) -> Vec<String> {
        match self {
            Value::String(s) => s.as_str().into_raw_tags(),
            Value::Array(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Split on commas, trim, lowercase, drop empty tokens, drop non-string
/// elements, dedupe preserving first-occurrence order.
///
/// Idempotent: `normalize_tags(normalize_tags(t)) == normalize_tags(t)`.
pub fn normalize_tags<T: TagSource>(input: T) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for raw in input.into_raw_tags() {
        for piece in raw.split(',') {
            let tag = piece.trim().to_lowercase();
            if tag.is_empty() {
                continue;
            }
            if seen.insert(tag.clone()) {
                out.push(tag);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_comma_separated_string() {
        assert_eq!(
            normalize_tags("Python, python,  PYTHON "),
            vec!["python".to_string()]
        );
    }

    #[test]
    fn sequence_of_strings() {
        let tags = vec!["Rust".to_string(), "rust".to_string(), "wasm".to_string()];
        assert_eq!(normalize_tags(tags.as_slice()), vec!["rust", "wasm"]);
    }

    #[test]
    fn none_yields_empty() {
        let none: Option<&str> = None;
        assert!(normalize_tags(none).is_empty());
    }

    #[test]
    fn json_array_drops_non_strings() {
        let v = serde_json::json!(["alpha", 3, "beta", null, "alpha"]);
        assert_eq!(normalize_tags(&v), vec!["alpha", "beta"]);
    }

    #[test]
    fn idempotent() {
        let once = normalize_tags("B, a, A, b");
        let twice = normalize_tags(once.as_slice());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_tokens_dropped() {
        assert_eq!(normalize_tags("a,, ,b"), vec!["a", "b"]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// §8: `normalize_tags(T) == normalize_tags(normalize_tags(T))` for
        /// any comma-separated input, not just the hand-picked examples above.
        #[test]
        fn normalize_tags_is_idempotent(raw in "[a-zA-Z0-9, ]{0,64}") {
            let once = normalize_tags(raw.as_str());
            let twice = normalize_tags(once.as_slice());
            prop_assert_eq!(once, twice);
        }

        /// Every emitted tag is already trimmed, lowercase and non-empty,
        /// whatever the input casing/whitespace looked like.
        #[test]
        fn normalized_tags_are_clean(raw in "[a-zA-Z0-9, ]{0,64}") {
            for tag in normalize_tags(raw.as_str()) {
                prop_assert_eq!(&tag, &tag.trim().to_lowercase());
                prop_assert!(!tag.is_empty());
            }
        }
    }
}
