use crate::errors::CortexResult;

/// Deterministic `text -> fixed-length float vector` map, plus the
/// dimension constant a store pins at open time. Stateless apart from a
/// lazily loaded model cache owned by the implementation.
pub trait EmbeddingProvider: Send + Sync {
    /// Embedding dimensionality. Fixed for the lifetime of the provider.
    fn dim(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> CortexResult<Vec<f32>>;

    /// Embed a batch. Implementations may overlap inference; callers should
    /// prefer this over looping `embed` for more than a handful of texts.
    fn embed_batch(&self, texts: &[String]) -> CortexResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Identifier recorded alongside stored embeddings (for migration
    /// detection when the provider changes).
    fn model_name(&self) -> &str;
}
