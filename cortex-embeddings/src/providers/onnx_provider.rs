//! Local neural embedding provider, backed by the `ort` ONNX Runtime
//! bindings. Mean-pools the last hidden state and L2-normalizes.

use std::path::Path;
use std::sync::Mutex;

use cortex_core::errors::CortexError;
use cortex_core::errors::CortexResult;
use cortex_core::traits::EmbeddingProvider;
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

pub struct OnnxEmbeddingProvider {
    session: Mutex<Session>,
    dim: usize,
    model_name: String,
}

// `Session::run` takes `&mut self`; the Mutex gives us the `Sync` the
// `EmbeddingProvider` trait requires.
unsafe impl Sync for OnnxEmbeddingProvider {}

impl OnnxEmbeddingProvider {
    pub fn load(model_path: &str, dim: usize) -> CortexResult<Self> {
        let path = Path::new(model_path);
        if !path.exists() {
            return Err(CortexError::FatalConfigError {
                reason: format!("onnx model not found at {model_path}"),
            });
        }

        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| CortexError::FatalConfigError {
                reason: format!("failed to load onnx model {model_path}: {e}"),
            })?;

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx-model")
            .to_string();

        debug!(model = %model_name, dim, "onnx model loaded");

        Ok(Self { session: Mutex::new(session), dim, model_name })
    }

    fn tokenize(text: &str) -> Vec<i64> {
        if text.is_empty() {
            return vec![101, 102];
        }
        let mut ids = vec![101i64];
        for word in text.split(|c: char| !c.is_alphanumeric() && c != '_') {
            if word.is_empty() {
                continue;
            }
            let mut h: u32 = 0x811c9dc5;
            for b in word.to_lowercase().as_bytes() {
                h ^= *b as u32;
                h = h.wrapping_mul(0x01000193);
            }
            ids.push(1 + (h % 29999) as i64);
        }
        ids.push(102);
        ids
    }
}

impl EmbeddingProvider for OnnxEmbeddingProvider {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        let ids = Self::tokenize(text);
        let seq_len = ids.len();
        let mask = vec![1i64; seq_len];

        let ids_tensor = Tensor::from_array((vec![1i64, seq_len as i64], ids)).map_err(|e| {
            CortexError::TransientBackendError { reason: format!("tensor creation: {e}") }
        })?;
        let mask_tensor = Tensor::from_array((vec![1i64, seq_len as i64], mask)).map_err(|e| {
            CortexError::TransientBackendError { reason: format!("tensor creation: {e}") }
        })?;

        let mut session = self.session.lock().map_err(|e| CortexError::TransientBackendError {
            reason: format!("onnx session lock poisoned: {e}"),
        })?;

        let outputs = session.run(ort::inputs![ids_tensor, mask_tensor]).map_err(|e| {
            CortexError::TransientBackendError { reason: format!("onnx inference: {e}") }
        })?;

        let (_name, output) = outputs.iter().next().ok_or_else(|| {
            CortexError::TransientBackendError { reason: "no output tensor".to_string() }
        })?;

        let (shape, data) = output.try_extract_tensor::<f32>().map_err(|e| {
            CortexError::TransientBackendError { reason: format!("tensor extraction: {e}") }
        })?;

        let mut pooled = if shape.len() == 3 {
            let seq = shape[1] as usize;
            let dims = shape[2] as usize;
            let mut out = vec![0.0f32; dims];
            for s in 0..seq {
                for d in 0..dims {
                    out[d] += data[s * dims + d];
                }
            }
            for v in &mut out {
                *v /= seq as f32;
            }
            out
        } else {
            let dims = shape.last().copied().unwrap_or(0) as usize;
            data[..dims].to_vec()
        };

        let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut pooled {
                *v /= norm;
            }
        }
        pooled.resize(self.dim, 0.0);
        Ok(pooled)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
