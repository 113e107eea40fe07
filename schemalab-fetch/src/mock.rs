//! Canned-response HTTP client for tests and demos.

use crate::client::HttpClient;
use crate::config::FetchRequestConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// An [`HttpClient`] that answers from a URL → response table.
///
/// A configured delay is subject to the request timeout, so timeouts can be
/// exercised without a network.
#[derive(Debug, Clone, Default)]
pub struct StaticHttpClient {
    responses: Arc<Mutex<HashMap<String, Result<String, FetchError>>>>,
    requests: Arc<Mutex<Vec<FetchRequestConfig>>>,
    delay: Option<Duration>,
}

impl StaticHttpClient {
    /// Create an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with `body`.
    #[must_use]
    pub fn with_response(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.lock().insert(url.into(), Ok(body.into()));
        self
    }

    /// Answer `url` with an error.
    #[must_use]
    pub fn with_error(self, url: impl Into<String>, error: FetchError) -> Self {
        self.responses.lock().insert(url.into(), Err(error));
        self
    }

    /// Delay every response.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests seen so far.
    #[must_use]
    pub fn recorded_requests(&self) -> Vec<FetchRequestConfig> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl HttpClient for StaticHttpClient {
    async fn request(&self, config: &FetchRequestConfig) -> Result<String, FetchError> {
        let url = config.parsed_url()?;
        self.requests.lock().push(config.clone());

        if let Some(delay) = self.delay {
            match config.timeout() {
                Some(timeout) if timeout < delay => {
                    tokio::time::sleep(timeout).await;
                    return Err(FetchError::Timeout(timeout));
                }
                _ => tokio::time::sleep(delay).await,
            }
        }

        let key = config.url.trim();
        self.responses
            .lock()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::network(format!("no response configured for {url}"))))
    }
}
