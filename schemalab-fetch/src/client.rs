//! The HTTP collaborator trait and its `reqwest` implementation.

use crate::config::FetchRequestConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Resolves a fetch request into the response body text.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform the request and return the body, whatever the status code.
    async fn request(&self, config: &FetchRequestConfig) -> Result<String, FetchError>;
}

/// [`HttpClient`] backed by `reqwest`.
///
/// The per-request timeout is enforced cooperatively: a timer task cancels a
/// [`CancellationToken`] that is raced against the request, so an expired
/// request is dropped mid-flight rather than awaited.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    default_timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Create a client with no default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            default_timeout: None,
        }
    }

    /// Timeout used when the request does not carry its own.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Perform the request, aborting early when `cancel` fires.
    ///
    /// # Errors
    ///
    /// [`FetchError::Timeout`] when the timeout elapses first,
    /// [`FetchError::Cancelled`] when `cancel` fires first, and URL or network
    /// errors otherwise.
    pub async fn request_with_cancel(
        &self,
        config: &FetchRequestConfig,
        cancel: CancellationToken,
    ) -> Result<String, FetchError> {
        let url = config.parsed_url()?;
        let mut builder = self.client.request(config.method.into(), url.clone());
        for (name, value) in config.effective_headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = config.effective_body() {
            builder = builder.body(body.to_string());
        }

        let timeout = config.timeout().or(self.default_timeout);
        let deadline = CancellationToken::new();
        let timer = timeout.map(|after| {
            let deadline = deadline.clone();
            tokio::spawn(async move {
                tokio::time::sleep(after).await;
                deadline.cancel();
            })
        });

        tracing::debug!(
            target: "schemalab::fetch",
            method = %config.method,
            url = %url,
            timeout_ms = timeout.map(|t| t.as_millis() as u64),
            "sending fetch request"
        );

        let send = async {
            let response = builder.send().await?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(target: "schemalab::fetch", %status, url = %url, "fetch returned non-success status");
            }
            Ok::<_, FetchError>(response.text().await?)
        };

        let result = tokio::select! {
            _ = cancel.cancelled() => Err(FetchError::Cancelled),
            _ = deadline.cancelled() => Err(FetchError::Timeout(timeout.unwrap_or_default())),
            result = send => result,
        };

        if let Some(timer) = timer {
            timer.abort();
        }
        if let Err(err) = &result {
            tracing::warn!(target: "schemalab::fetch", error = %err, "fetch request failed");
        }
        result
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(&self, config: &FetchRequestConfig) -> Result<String, FetchError> {
        self.request_with_cancel(config, CancellationToken::new()).await
    }
}
