//! Thin `reqwest::blocking` wrapper: bearer auth, deadline enforcement, and
//! error classification into the shared `CloudError` taxonomy.

use std::sync::Mutex;
use std::time::Duration;

use cortex_core::errors::CloudError;
use serde::{de::DeserializeOwned, Serialize};

use crate::rate_limit::RateLimiter;

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
    pub max_requests_per_minute: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bearer_token: None,
            timeout: Duration::from_secs(10),
            max_requests_per_minute: 120,
        }
    }
}

pub struct HttpClient {
    client: reqwest::blocking::Client,
    base_url: String,
    bearer_token: Mutex<Option<String>>,
    rate_limiter: RateLimiter,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client configuration is valid");
        Self {
            client,
            base_url: config.base_url,
            bearer_token: Mutex::new(config.bearer_token),
            rate_limiter: RateLimiter::new(config.max_requests_per_minute),
        }
    }

    pub fn set_bearer_token(&self, token: String) {
        if let Ok(mut guard) = self.bearer_token.lock() {
            *guard = Some(token);
        }
    }

    pub fn clear_bearer_token(&self) {
        if let Ok(mut guard) = self.bearer_token.lock() {
            *guard = None;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, CloudError> {
        if !self.rate_limiter.try_acquire() {
            return Err(CloudError::RateLimited { retry_after_secs: 60 });
        }
        let token = self
            .bearer_token
            .lock()
            .map_err(|_| CloudError::ConnectError { reason: "http client token lock poisoned".to_string() })?
            .clone();
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(t) = token {
            req = req.bearer_auth(t);
        }
        let response = req.send().map_err(classify_transport_error)?;
        handle_response(response)
    }

    pub fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, CloudError> {
        if !self.rate_limiter.try_acquire() {
            return Err(CloudError::RateLimited { retry_after_secs: 60 });
        }
        let token = self
            .bearer_token
            .lock()
            .map_err(|_| CloudError::ConnectError { reason: "http client token lock poisoned".to_string() })?
            .clone();
        let mut req = self.client.get(self.url(path));
        if let Some(t) = token {
            req = req.bearer_auth(t);
        }
        let response = req.send().map_err(classify_transport_error)?;
        handle_response(response)
    }
}

fn classify_transport_error(e: reqwest::Error) -> CloudError {
    if e.is_timeout() {
        CloudError::Timeout { elapsed_ms: 0 }
    } else if e.is_connect() {
        CloudError::ConnectError { reason: e.to_string() }
    } else {
        CloudError::ConnectError { reason: e.to_string() }
    }
}

fn handle_response<R: DeserializeOwned>(response: reqwest::blocking::Response) -> Result<R, CloudError> {
    let status = response.status();
    if status.as_u16() == 429 {
        return Err(CloudError::RateLimited { retry_after_secs: 30 });
    }
    if status.is_server_error() {
        return Err(CloudError::ServerError { status: status.as_u16(), message: status.to_string() });
    }
    if status.is_client_error() {
        let message = response.text().unwrap_or_default();
        return Err(CloudError::ClientError { status: status.as_u16(), message });
    }
    response.json::<R>().map_err(|e| CloudError::ServerError { status: 0, message: e.to_string() })
}
