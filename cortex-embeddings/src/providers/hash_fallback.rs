//! Pure-software embedding fallback, used when neither a local neural model
//! nor a cloud model is available. Deterministic and dependency-free: a
//! hashed bag-of-tokens projected into a fixed-width vector and
//! L2-normalized so cosine similarity behaves sensibly.

use cortex_core::errors::CortexResult;
use cortex_core::traits::EmbeddingProvider;

pub struct HashEmbeddingProvider {
    dim: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(256)
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty())
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        let mut vec = vec![0f32; self.dim];
        let lower = text.to_lowercase();
        for token in tokenize(&lower) {
            let digest = blake3::hash(token.as_bytes());
            let bytes = digest.as_bytes();
            // Feature hashing: each token votes into one bucket, sign taken
            // from a second byte so opposite tokens don't always add.
            let bucket = (u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
                % self.dim;
            let sign = if bytes[4] & 1 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign;
        }
        let norm = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        }
        Ok(vec)
    }

    fn model_name(&self) -> &str {
        "hash-fallback-v1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let p = HashEmbeddingProvider::new(64);
        assert_eq!(p.embed("hello world").unwrap(), p.embed("hello world").unwrap());
    }

    #[test]
    fn dim_matches() {
        let p = HashEmbeddingProvider::new(64);
        assert_eq!(p.embed("anything").unwrap().len(), 64);
    }

    #[test]
    fn empty_store_never_rejects_on_empty_text() {
        let p = HashEmbeddingProvider::new(32);
        let v = p.embed("").unwrap();
        assert_eq!(v.len(), 32);
    }

    #[test]
    fn similar_text_more_similar_than_unrelated() {
        let p = HashEmbeddingProvider::new(128);
        let a = p.embed("the quick brown fox jumps").unwrap();
        let b = p.embed("the quick brown fox leaps").unwrap();
        let c = p.embed("stock market quarterly earnings report").unwrap();

        let cos = |x: &[f32], y: &[f32]| -> f32 {
            x.iter().zip(y).map(|(a, b)| a * b).sum::<f32>()
        };
        assert!(cos(&a, &b) > cos(&a, &c));
    }
}
