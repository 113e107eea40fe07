//! OpenAI Chat Completions extraction model.

use super::types::*;
use crate::error::{ModelError, ModelResult};
use crate::model::{
    ensure_conforms, CompletionRequest, ExtractionModel, ExtractionRequest, ExtractionResponse,
};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use schemalab_core::RequestUsage;
use schemalab_schema::{parse_schema_exact, to_json_schema};
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Name of the structured-output schema sent to the API.
const SCHEMA_NAME: &str = "extraction";

/// OpenAI Chat Completions model.
///
/// The model id is taken from each request, so one client serves every
/// generator. Schema text that parses to fields is sent as a strict JSON
/// schema; anything else is embedded in the system prompt with JSON mode on.
#[derive(Debug, Clone)]
pub struct OpenAIChatModel {
    client: Client,
    api_key: String,
    base_url: String,
    default_timeout: Duration,
    allowed_models: Option<Vec<String>>,
}

impl OpenAIChatModel {
    /// Create a new OpenAI chat model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            default_timeout: Duration::from_secs(120),
            allowed_models: None,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self, ModelError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ModelError::Configuration("OPENAI_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set a custom HTTP client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Only accept these model ids.
    #[must_use]
    pub fn with_allowed_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_models = Some(models.into_iter().map(Into::into).collect());
        self
    }

    fn check_allowed(&self, model_id: &str) -> ModelResult<()> {
        match &self.allowed_models {
            Some(allowed) if !allowed.iter().any(|m| m == model_id) => {
                Err(ModelError::NotAllowed(model_id.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn build_extraction_request(&self, req: &ExtractionRequest) -> ChatCompletionRequest {
        let fields = parse_schema_exact(&req.schema_text).filter(|f| !f.is_empty());
        let mut messages = Vec::with_capacity(2);

        let response_format = if let Some(fields) = fields {
            if !req.system_instruction.trim().is_empty() {
                messages.push(ChatMessage::system(&req.system_instruction));
            }
            ResponseFormat::json_schema(SCHEMA_NAME, to_json_schema(&fields), true)
        } else {
            let schema_prompt = format!(
                "Respond with a single JSON object that matches this schema:\n{}",
                req.schema_text
            );
            let system = if req.system_instruction.trim().is_empty() {
                schema_prompt
            } else {
                format!("{}\n\n{}", req.system_instruction, schema_prompt)
            };
            messages.push(ChatMessage::system(system));
            ResponseFormat::json_object()
        };
        messages.push(ChatMessage::user(&req.prompt));

        ChatCompletionRequest {
            model: req.model_id.clone(),
            messages,
            response_format: Some(response_format),
        }
    }

    fn build_completion_request(&self, req: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if !req.system_instruction.trim().is_empty() {
            messages.push(ChatMessage::system(&req.system_instruction));
        }
        messages.push(ChatMessage::user(&req.prompt));
        ChatCompletionRequest {
            model: req.model_id.clone(),
            messages,
            response_format: None,
        }
    }

    async fn send(&self, body: &ChatCompletionRequest) -> ModelResult<ChatCompletionResponse> {
        tracing::debug!(
            target: "schemalab::models::openai",
            model = %body.model,
            structured = body.response_format.is_some(),
            "sending chat completion"
        );

        let timeout = self.default_timeout;
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(timeout)
                } else {
                    ModelError::from(e)
                }
            })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(target: "schemalab::models::openai", status, "chat completion failed");
            return Err(Self::handle_error_response(status, &body, &headers));
        }

        response
            .json()
            .await
            .map_err(|e| ModelError::invalid_response(e.to_string()))
    }

    /// Take the first choice's text, treating a refusal as filtered content.
    fn first_content(resp: &ChatCompletionResponse) -> ModelResult<Option<String>> {
        let choice = resp
            .choices
            .first()
            .ok_or_else(|| ModelError::invalid_response("response contained no choices"))?;
        if let Some(refusal) = &choice.message.refusal {
            return Err(ModelError::ContentFiltered(refusal.clone()));
        }
        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(ModelError::ContentFiltered("finish_reason=content_filter".to_string()));
        }
        Ok(choice.message.content.clone())
    }

    fn convert_usage(usage: Option<Usage>) -> Option<RequestUsage> {
        usage.map(|u| {
            RequestUsage::with_tokens(u.prompt_tokens, u.completion_tokens).total_tokens(u.total_tokens)
        })
    }

    /// Parse retry-after header.
    fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
        headers
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Handle API error response.
    fn handle_error_response(status: u16, body: &str, headers: &HeaderMap) -> ModelError {
        if let Ok(err) = serde_json::from_str::<OpenAIError>(body) {
            let code = err.error.code.clone();

            if status == 401 {
                return ModelError::auth(err.error.message);
            }
            if status == 429 {
                return ModelError::rate_limited(Self::parse_retry_after(headers));
            }
            if status == 404 {
                return ModelError::NotFound(err.error.message);
            }
            if code.as_deref() == Some("context_length_exceeded") {
                return ModelError::ContextLengthExceeded(err.error.message);
            }

            return ModelError::Api {
                message: err.error.message,
                code,
            };
        }

        if status == 429 {
            return ModelError::rate_limited(Self::parse_retry_after(headers));
        }

        ModelError::http(status, body)
    }
}

#[async_trait]
impl ExtractionModel for OpenAIChatModel {
    fn name(&self) -> &str {
        "openai"
    }

    async fn extract(&self, request: &ExtractionRequest) -> ModelResult<ExtractionResponse> {
        self.check_allowed(&request.model_id)?;
        let body = self.build_extraction_request(request);
        let resp = self.send(&body).await?;

        let content = Self::first_content(&resp)?
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::MissingObject)?;
        let value: JsonValue = serde_json::from_str(&content)
            .map_err(|e| ModelError::invalid_response(format!("model returned malformed JSON: {e}")))?;
        let object = ensure_conforms(&request.schema_text, value)?;

        Ok(ExtractionResponse {
            object,
            usage: Self::convert_usage(resp.usage),
        })
    }

    async fn complete(&self, request: &CompletionRequest) -> ModelResult<String> {
        self.check_allowed(&request.model_id)?;
        let body = self.build_completion_request(request);
        let resp = self.send(&body).await?;
        Ok(Self::first_content(&resp)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SCHEMA: &str = "z.object({\n  summary: z.string()\n})";

    fn completion(content: &str) -> JsonValue {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 0,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
        })
    }

    fn model(server: &MockServer) -> OpenAIChatModel {
        OpenAIChatModel::new("sk-test").with_base_url(server.uri())
    }

    fn request(schema: &str) -> ExtractionRequest {
        ExtractionRequest::new("gpt-4o", "Vercel is a platform.")
            .with_system_instruction("Extract.")
            .with_schema_text(schema)
    }

    #[test]
    fn test_builder() {
        let model = OpenAIChatModel::new("sk")
            .with_base_url("https://proxy.local/v1/")
            .with_timeout(Duration::from_secs(5))
            .with_allowed_models(["gpt-4o"]);
        assert_eq!(model.base_url, "https://proxy.local/v1");
        assert_eq!(model.default_timeout, Duration::from_secs(5));
        assert!(model.check_allowed("gpt-4o").is_ok());
        assert!(matches!(
            model.check_allowed("o1"),
            Err(ModelError::NotAllowed(id)) if id == "o1"
        ));
    }

    #[test]
    fn test_build_structured_request() {
        let body = OpenAIChatModel::new("sk").build_extraction_request(&request(SCHEMA));
        let format = body.response_format.unwrap();
        assert_eq!(format.format_type, "json_schema");
        let schema = format.json_schema.unwrap().schema;
        assert_eq!(schema["required"], json!(["summary"]));
        assert_eq!(body.messages[0], ChatMessage::system("Extract."));
        assert_eq!(body.messages[1], ChatMessage::user("Vercel is a platform."));
    }

    #[test]
    fn test_build_json_mode_request_for_unparsable_schema() {
        let req = request("z.union([z.string(), z.number()])");
        let body = OpenAIChatModel::new("sk").build_extraction_request(&req);
        assert_eq!(body.response_format.unwrap().format_type, "json_object");
        assert!(body.messages[0].content.starts_with("Extract.\n\nRespond with a single JSON object"));
        assert!(body.messages[0].content.ends_with("z.union([z.string(), z.number()])"));
    }

    #[test]
    fn test_optional_fields_use_json_mode() {
        let schema = "z.object({ age: z.number().optional(), id: z.union([z.string(), z.number()]) })";
        let body = OpenAIChatModel::new("sk").build_extraction_request(&request(schema));
        let format = body.response_format.unwrap();
        assert_eq!(format.format_type, "json_object");
        assert!(format.json_schema.is_none());
        assert!(body.messages[0].content.ends_with(schema));
    }

    #[tokio::test]
    async fn test_extract_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o",
                "response_format": { "type": "json_schema" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"summary":"A platform."}"#)))
            .expect(1)
            .mount(&server)
            .await;

        let resp = model(&server).extract(&request(SCHEMA)).await.unwrap();
        assert_eq!(resp.object, json!({ "summary": "A platform." }));
        assert_eq!(resp.usage, Some(RequestUsage::with_tokens(42, 7)));
    }

    #[tokio::test]
    async fn test_extract_schema_violation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(r#"{"title":"x"}"#)))
            .mount(&server)
            .await;

        match model(&server).extract(&request(SCHEMA)).await {
            Err(ModelError::SchemaValidation { issues, value }) => {
                assert_eq!(issues[0].path, "summary");
                assert_eq!(issues[0].message, "Required");
                assert_eq!(value, json!({ "title": "x" }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_empty_and_malformed_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("  ")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{not json")))
            .mount(&server)
            .await;

        let model = model(&server);
        assert!(matches!(
            model.extract(&request(SCHEMA)).await,
            Err(ModelError::MissingObject)
        ));
        assert!(matches!(
            model.extract(&request(SCHEMA)).await,
            Err(ModelError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_refusal_is_content_filtered() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{
                    "message": { "role": "assistant", "content": null, "refusal": "I can't help with that." },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&server)
            .await;

        let err = model(&server).extract(&request(SCHEMA)).await.unwrap_err();
        assert!(matches!(err, ModelError::ContentFiltered(msg) if msg == "I can't help with that."));
    }

    #[tokio::test]
    async fn test_error_mapping() {
        let server = MockServer::start().await;
        let api_error = |message: &str, code: &str| {
            json!({ "error": { "message": message, "type": "invalid_request_error", "param": null, "code": code } })
        };
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(api_error("Incorrect API key", "invalid_api_key")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("retry-after", "7")
                    .set_body_string("slow down"),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(api_error("maximum context length", "context_length_exceeded")),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let model = model(&server);
        let req = request(SCHEMA);
        assert!(matches!(
            model.extract(&req).await,
            Err(ModelError::Authentication(msg)) if msg == "Incorrect API key"
        ));
        let err = model.extract(&req).await.unwrap_err();
        assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
        assert!(matches!(
            model.extract(&req).await,
            Err(ModelError::ContextLengthExceeded(_))
        ));
        let err = model.extract(&req).await.unwrap_err();
        assert!(matches!(err, ModelError::Http { status: 502, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_disallowed_model_never_sends() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("{}")))
            .expect(0)
            .mount(&server)
            .await;

        let model = model(&server).with_allowed_models(["gpt-4o-mini"]);
        let err = model.extract(&request(SCHEMA)).await.unwrap_err();
        assert_eq!(err.to_string(), "Model 'gpt-4o' is not allowed.");
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("{}"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let model = model(&server).with_timeout(Duration::from_millis(50));
        let err = model.extract(&request(SCHEMA)).await.unwrap_err();
        assert!(matches!(err, ModelError::Timeout(d) if d == Duration::from_millis(50)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_complete_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    { "role": "system", "content": "Write system messages." },
                    { "role": "user", "content": "extract invoices" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("You extract invoices.")))
            .mount(&server)
            .await;

        let text = model(&server)
            .complete(&CompletionRequest::new("gpt-4o", "Write system messages.", "extract invoices"))
            .await
            .unwrap();
        assert_eq!(text, "You extract invoices.");
    }
}
