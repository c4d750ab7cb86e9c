//! Cloud embedding model, used when no local neural model is available.
//! A thin, blocking HTTP client — the embedding provider contract is
//! synchronous at the call site, so we use `reqwest::blocking` rather than
//! spawning a runtime per call.

use cortex_core::errors::CortexError;
use cortex_core::errors::CortexResult;
use cortex_core::traits::EmbeddingProvider;
use serde::{Deserialize, Serialize};

pub struct CloudEmbeddingProvider {
    endpoint: String,
    api_key: String,
    dim: usize,
    model_name: String,
    client: reqwest::blocking::Client,
}

impl CloudEmbeddingProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, dim: usize, model_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            dim,
            model_name: model_name.into(),
            client: reqwest::blocking::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("reqwest client"),
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl EmbeddingProvider for CloudEmbeddingProvider {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> CortexResult<Vec<f32>> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest { input: text, model: &self.model_name })
            .send()
            .map_err(|e| CortexError::TransientBackendError {
                reason: format!("cloud embedding request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            return Err(CortexError::TransientBackendError {
                reason: format!("cloud embedding returned {}", resp.status()),
            });
        }

        let body: EmbedResponse = resp.json().map_err(|e| CortexError::TransientBackendError {
            reason: format!("cloud embedding decode failed: {e}"),
        })?;
        Ok(body.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
