pub mod hash_fallback;

#[cfg(feature = "onnx")]
pub mod onnx_provider;

#[cfg(feature = "cloud")]
pub mod cloud_provider;

pub use hash_fallback::HashEmbeddingProvider;

#[cfg(feature = "onnx")]
pub use onnx_provider::OnnxEmbeddingProvider;

#[cfg(feature = "cloud")]
pub use cloud_provider::CloudEmbeddingProvider;
