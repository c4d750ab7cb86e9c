//! # cortex-cloud
//!
//! The cloud vector store (CVS): an HTTP-backed mirror of the local store's
//! schema and operation set, with token auth, retry/backoff classification,
//! and lazy schema migration on first connect.

pub mod engine;
pub mod rate_limit;
pub mod schema;
pub mod transport;

pub use engine::CloudStore;
pub use transport::http_client::HttpClientConfig;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_config_has_sane_defaults() {
        let config = HttpClientConfig::default();
        assert!(config.timeout.as_secs() > 0);
        assert!(config.max_requests_per_minute > 0);
    }
}
