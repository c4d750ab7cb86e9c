//! EmbeddingEngine — owns the provider fallback chain (local neural model →
//! cloud model → hash-based fallback) and the L1/L2 embedding caches.
//!
//! A store pins exactly one `dim()` for its lifetime; opening with a
//! mismatched dimension is a `FatalConfigError` (checked by the caller at
//! store-open time, not here).

use cortex_core::errors::CortexResult;
use cortex_core::traits::EmbeddingProvider;
use tracing::warn;

use crate::cache::{L1Cache, L2Cache};
use crate::providers::HashEmbeddingProvider;

pub struct EmbeddingEngine {
    primary: Option<Box<dyn EmbeddingProvider>>,
    cloud_fallback: Option<Box<dyn EmbeddingProvider>>,
    hash_fallback: HashEmbeddingProvider,
    l1: L1Cache,
    l2: Option<L2Cache>,
    dim: usize,
}

impl EmbeddingEngine {
    pub fn new(
        dim: usize,
        primary: Option<Box<dyn EmbeddingProvider>>,
        cloud_fallback: Option<Box<dyn EmbeddingProvider>>,
        l2: Option<L2Cache>,
    ) -> Self {
        Self {
            primary,
            cloud_fallback,
            hash_fallback: HashEmbeddingProvider::new(dim),
            l1: L1Cache::new(10_000),
            l2,
            dim,
        }
    }

    /// Hash-fallback-only engine: no neural model, no network. Always
    /// available and fully deterministic.
    pub fn fallback_only(dim: usize) -> Self {
        Self::new(dim, None, None, None)
    }

    fn active_model_name(&self) -> &str {
        if let Some(p) = &self.primary {
            p.model_name()
        } else if let Some(p) = &self.cloud_fallback {
            p.model_name()
        } else {
            self.hash_fallback.model_name()
        }
    }
}

impl EmbeddingProvider for EmbeddingEngine {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        let hash = cortex_core::hash::content_hash(text);
        let model = self.active_model_name().to_string();

        if let Some(cached) = self.l1.get(&hash) {
            return Ok(cached);
        }
        if let Some(l2) = &self.l2 {
            if let Ok(Some(cached)) = l2.get(&hash, &model) {
                self.l1.put(hash.clone(), cached.clone());
                return Ok(cached);
            }
        }

        let vec = self.embed_uncached(text);

        self.l1.put(hash.clone(), vec.clone());
        if let Some(l2) = &self.l2 {
            let _ = l2.put(&hash, &model, &vec);
        }
        Ok(vec)
    }

    fn model_name(&self) -> &str {
        self.active_model_name()
    }
}

impl EmbeddingEngine {
    fn embed_uncached(&self, text: &str) -> Vec<f32> {
        if let Some(primary) = &self.primary {
            match primary.embed(text) {
                Ok(v) => return v,
                Err(e) => warn!(error = %e, "primary embedding provider failed, falling back"),
            }
        }
        if let Some(cloud) = &self.cloud_fallback {
            match cloud.embed(text) {
                Ok(v) => return v,
                Err(e) => warn!(error = %e, "cloud embedding provider failed, falling back to hash"),
            }
        }
        // Hash fallback never fails.
        self.hash_fallback.embed(text).expect("hash fallback is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_only_is_deterministic() {
        let engine = EmbeddingEngine::fallback_only(32);
        assert_eq!(engine.embed("hello").unwrap(), engine.embed("hello").unwrap());
    }

    #[test]
    fn caches_repeated_queries() {
        let engine = EmbeddingEngine::fallback_only(16);
        let first = engine.embed("cache me").unwrap();
        assert_eq!(engine.l1.len(), 1);
        let second = engine.embed("cache me").unwrap();
        assert_eq!(first, second);
    }
}
