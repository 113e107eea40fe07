//! Mock and function-based models for testing.
//!
//! - [`MockModel`]: a queue of canned replies
//! - [`FunctionModel`]: replies computed by a closure
//!
//! ```rust
//! use schemalab_models::MockModel;
//! use serde_json::json;
//!
//! let model = MockModel::new()
//!     .with_object(json!({ "summary": "first" }))
//!     .with_text("A system message.");
//! ```

use crate::error::{ModelError, ModelResult};
use crate::model::{
    ensure_conforms, CompletionRequest, ExtractionModel, ExtractionRequest, ExtractionResponse,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use schemalab_core::RequestUsage;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

enum MockReply {
    Object(ExtractionResponse),
    Text(String),
    Error(ModelError),
}

/// A model that answers from a queue of canned replies, oldest first.
///
/// Objects are checked against the request schema like a real provider
/// would, so schema rejections can be exercised. An empty queue yields
/// [`ModelError::MissingObject`] for extraction and an empty string for
/// completion.
#[derive(Clone, Default)]
pub struct MockModel {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    extractions: Arc<Mutex<Vec<ExtractionRequest>>>,
    completions: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl std::fmt::Debug for MockModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockModel")
            .field("queued", &self.replies.lock().len())
            .field("delay", &self.delay)
            .finish()
    }
}

impl MockModel {
    /// Create a model with an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, reply: MockReply) -> Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Queue an object without usage.
    #[must_use]
    pub fn with_object(self, object: JsonValue) -> Self {
        self.push(MockReply::Object(ExtractionResponse::new(object)))
    }

    /// Queue an object with reported usage.
    #[must_use]
    pub fn with_object_and_usage(self, object: JsonValue, usage: RequestUsage) -> Self {
        self.push(MockReply::Object(ExtractionResponse::new(object).with_usage(usage)))
    }

    /// Queue a completion.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.push(MockReply::Text(text.into()))
    }

    /// Queue an error.
    #[must_use]
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(MockReply::Error(error))
    }

    /// Wait before every reply.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Extraction requests seen so far.
    #[must_use]
    pub fn extraction_requests(&self) -> Vec<ExtractionRequest> {
        self.extractions.lock().clone()
    }

    /// Completion requests seen so far.
    #[must_use]
    pub fn completion_requests(&self) -> Vec<CompletionRequest> {
        self.completions.lock().clone()
    }

    async fn next_reply(&self) -> Option<MockReply> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies.lock().pop_front()
    }
}

#[async_trait]
impl ExtractionModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract(&self, request: &ExtractionRequest) -> ModelResult<ExtractionResponse> {
        self.extractions.lock().push(request.clone());
        match self.next_reply().await {
            Some(MockReply::Object(response)) => {
                let object = ensure_conforms(&request.schema_text, response.object)?;
                Ok(ExtractionResponse {
                    object,
                    usage: response.usage,
                })
            }
            Some(MockReply::Error(err)) => Err(err),
            Some(MockReply::Text(_)) | None => Err(ModelError::MissingObject),
        }
    }

    async fn complete(&self, request: &CompletionRequest) -> ModelResult<String> {
        self.completions.lock().push(request.clone());
        match self.next_reply().await {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Object(response)) => Ok(response.object.to_string()),
            Some(MockReply::Error(err)) => Err(err),
            None => Ok(String::new()),
        }
    }
}

/// Extraction callback.
pub type ExtractFn = dyn Fn(&ExtractionRequest) -> ModelResult<ExtractionResponse> + Send + Sync;

/// Completion callback.
pub type CompleteFn = dyn Fn(&CompletionRequest) -> ModelResult<String> + Send + Sync;

/// A model whose replies are computed from the request.
///
/// ```rust
/// use schemalab_models::{ExtractionResponse, FunctionModel};
/// use serde_json::json;
///
/// let model = FunctionModel::new(|req| {
///     Ok(ExtractionResponse::new(json!({ "length": req.prompt.len() })))
/// });
/// ```
#[derive(Clone)]
pub struct FunctionModel {
    extract: Arc<ExtractFn>,
    complete: Option<Arc<CompleteFn>>,
}

impl std::fmt::Debug for FunctionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionModel")
            .field("has_complete", &self.complete.is_some())
            .finish()
    }
}

impl FunctionModel {
    /// Create a model from an extraction callback. Its output is not checked
    /// against the schema.
    pub fn new<F>(extract: F) -> Self
    where
        F: Fn(&ExtractionRequest) -> ModelResult<ExtractionResponse> + Send + Sync + 'static,
    {
        Self {
            extract: Arc::new(extract),
            complete: None,
        }
    }

    /// Add a completion callback.
    #[must_use]
    pub fn with_complete<F>(mut self, complete: F) -> Self
    where
        F: Fn(&CompletionRequest) -> ModelResult<String> + Send + Sync + 'static,
    {
        self.complete = Some(Arc::new(complete));
        self
    }
}

#[async_trait]
impl ExtractionModel for FunctionModel {
    fn name(&self) -> &str {
        "function"
    }

    async fn extract(&self, request: &ExtractionRequest) -> ModelResult<ExtractionResponse> {
        (self.extract)(request)
    }

    async fn complete(&self, request: &CompletionRequest) -> ModelResult<String> {
        match &self.complete {
            Some(f) => f(request),
            None => Err(ModelError::Other(anyhow::anyhow!(
                "completion not configured for FunctionModel"
            ))),
        }
    }
}
