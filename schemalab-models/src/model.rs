//! The LLM collaborator trait and its request/response types.

use async_trait::async_trait;
use schemalab_core::RequestUsage;
use schemalab_schema::{check_value, parse_schema_exact};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

use crate::error::{ModelError, ModelResult};

/// One structured-extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// The text to extract from.
    pub prompt: String,
    /// Model id.
    pub model_id: String,
    /// System instruction.
    pub system_instruction: String,
    /// Schema text the returned object must satisfy.
    pub schema_text: String,
}

impl ExtractionRequest {
    /// Create a request with an empty system instruction and schema.
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model_id: model_id.into(),
            system_instruction: String::new(),
            schema_text: String::new(),
        }
    }

    /// Set the system instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, system: impl Into<String>) -> Self {
        self.system_instruction = system.into();
        self
    }

    /// Set the schema text.
    #[must_use]
    pub fn with_schema_text(mut self, schema: impl Into<String>) -> Self {
        self.schema_text = schema.into();
        self
    }
}

/// The object a model produced, plus reported usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    /// The generated object.
    pub object: JsonValue,
    /// Token usage, if the provider reported it.
    pub usage: Option<RequestUsage>,
}

impl ExtractionResponse {
    /// Create a response without usage.
    pub fn new(object: JsonValue) -> Self {
        Self {
            object,
            usage: None,
        }
    }

    /// Attach usage.
    #[must_use]
    pub fn with_usage(mut self, usage: RequestUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A plain text completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Model id.
    pub model_id: String,
    /// System instruction.
    pub system_instruction: String,
    /// User prompt.
    pub prompt: String,
}

impl CompletionRequest {
    /// Create a completion request.
    pub fn new(
        model_id: impl Into<String>,
        system_instruction: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            system_instruction: system_instruction.into(),
            prompt: prompt.into(),
        }
    }
}

/// An LLM that turns text into schema-conforming objects.
///
/// Implementations must return [`ModelError::MissingObject`] when no object
/// comes back and [`ModelError::SchemaValidation`] when it does not conform
/// to `schema_text`. [`ensure_conforms`] does the latter.
#[async_trait]
pub trait ExtractionModel: Send + Sync {
    /// Name of the provider, for logs.
    fn name(&self) -> &str;

    /// Generate an object from the request.
    async fn extract(&self, request: &ExtractionRequest) -> ModelResult<ExtractionResponse>;

    /// Generate free text.
    async fn complete(&self, request: &CompletionRequest) -> ModelResult<String>;
}

/// Shared model handle.
pub type BoxedModel = Arc<dyn ExtractionModel>;

/// Check `object` against the fields `schema_text` parses to.
///
/// Only schema text the field model represents exactly is checked locally.
/// Anything else (optional or nullable fields, unions, literals, bounds)
/// is left to the provider, and the object passes.
///
/// # Errors
///
/// [`ModelError::MissingObject`] for `null`, [`ModelError::SchemaValidation`]
/// when any issue is found.
pub fn ensure_conforms(schema_text: &str, object: JsonValue) -> ModelResult<JsonValue> {
    if object.is_null() {
        return Err(ModelError::MissingObject);
    }
    let Some(fields) = parse_schema_exact(schema_text).filter(|f| !f.is_empty()) else {
        return Ok(object);
    };
    let issues = check_value(&fields, &object);
    if issues.is_empty() {
        Ok(object)
    } else {
        tracing::debug!(
            target: "schemalab::models",
            issues = issues.len(),
            "generated object failed schema check"
        );
        Err(ModelError::schema_validation(issues, object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCHEMA: &str = "z.object({ summary: z.string() })";

    #[test]
    fn test_request_builder() {
        let req = ExtractionRequest::new("gpt-4o", "text")
            .with_system_instruction("sys")
            .with_schema_text(SCHEMA);
        assert_eq!(req.model_id, "gpt-4o");
        assert_eq!(req.system_instruction, "sys");
        assert_eq!(req.schema_text, SCHEMA);
    }

    #[test]
    fn test_ensure_conforms_accepts_valid() {
        let value = ensure_conforms(SCHEMA, json!({ "summary": "ok" })).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_ensure_conforms_rejects_null_and_mismatch() {
        assert!(matches!(
            ensure_conforms(SCHEMA, JsonValue::Null),
            Err(ModelError::MissingObject)
        ));
        match ensure_conforms(SCHEMA, json!({ "summary": 3 })) {
            Err(ModelError::SchemaValidation { issues, value }) => {
                assert_eq!(issues[0].path, "summary");
                assert_eq!(value, json!({ "summary": 3 }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unparsable_schema_passes_through() {
        let value = ensure_conforms("z.union([z.string()])", json!({ "a": 1 })).unwrap();
        assert_eq!(value, json!({ "a": 1 }));
    }

    #[test]
    fn test_optional_and_union_fields_are_not_forced_to_strings() {
        let schema =
            "z.object({ age: z.number().optional(), id: z.union([z.string(), z.number()]) })";
        let value = ensure_conforms(schema, json!({ "age": 30, "id": 7 })).unwrap();
        assert_eq!(value, json!({ "age": 30, "id": 7 }));

        let value = ensure_conforms(schema, json!({ "id": "a" })).unwrap();
        assert_eq!(value, json!({ "id": "a" }));
    }

    #[test]
    fn test_exact_schema_with_trailing_semicolon_is_checked() {
        let result = ensure_conforms("z.object({ n: z.number() });", json!({ "n": "x" }));
        assert!(matches!(result, Err(ModelError::SchemaValidation { .. })));
    }
}
