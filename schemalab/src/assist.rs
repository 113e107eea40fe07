//! AI-assisted drafting of system messages and schemas.

use schemalab_models::{BoxedModel, CompletionRequest, ExtractionRequest, ModelError};
use schemalab_schema::{validate_schema_text, SchemaTextError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

const SYSTEM_MESSAGE_INSTRUCTION: &str = "You are an expert at writing system messages for AI assistants. Create concise, effective system messages that clearly define the AI's role and behavior. Focus on being specific about the task, output format, and any constraints. Keep it under 200 words.";

const SCHEMA_INSTRUCTION: &str = "You are an expert at creating Zod schemas for structured data extraction. Return only valid schema code built from z.object, z.string, z.number, z.boolean, z.array and z.enum. Use .describe() to document fields. Never use .max().";

const FULL_CONFIG_INSTRUCTION: &str = "You are an expert at designing structured data extraction setups. Produce a system message and a matching Zod schema. The schema must start with z.object and must not use .max().";

const FULL_CONFIG_SCHEMA: &str = "z.object({ systemMessage: z.string(), schema: z.string() })";

/// Why a draft could not be produced.
#[derive(Debug, Error)]
pub enum AssistError {
    /// The model call failed.
    #[error("AI generation failed: {0}")]
    Model(#[from] ModelError),

    /// The drafted schema did not pass the validator.
    #[error("Invalid schema: {0}")]
    InvalidSchema(#[from] SchemaTextError),

    /// The drafted schema is not an object schema.
    #[error("Generated schema does not start with z.object")]
    NotObjectSchema,

    /// The structured reply lacked a required field.
    #[error("Response is missing '{0}'")]
    MissingField(&'static str),
}

/// A drafted generator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDraft {
    /// System message.
    pub system_message: String,
    /// Schema text.
    pub schema: String,
}

/// Drafts system messages and schemas from a plain-language description.
#[derive(Clone)]
pub struct ConfigAssistant {
    model: BoxedModel,
    model_id: String,
}

impl std::fmt::Debug for ConfigAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigAssistant")
            .field("model", &self.model.name())
            .field("model_id", &self.model_id)
            .finish()
    }
}

impl ConfigAssistant {
    /// Create an assistant that sends requests for `model_id` through `model`.
    pub fn new(model: BoxedModel, model_id: impl Into<String>) -> Self {
        Self {
            model,
            model_id: model_id.into(),
        }
    }

    /// Draft a system message for an assistant that should do `prompt`.
    ///
    /// # Errors
    ///
    /// [`AssistError::Model`] when the call fails.
    pub async fn draft_system_message(&self, prompt: &str) -> Result<String, AssistError> {
        let request = CompletionRequest::new(
            &self.model_id,
            SYSTEM_MESSAGE_INSTRUCTION,
            format!("Create a system message for an AI that should: {prompt}"),
        );
        let text = self.model.complete(&request).await?;
        debug!(target: "schemalab::assist", chars = text.len(), "drafted system message");
        Ok(text.trim().to_string())
    }

    /// Draft schema text for `prompt`.
    ///
    /// # Errors
    ///
    /// [`AssistError::NotObjectSchema`] or [`AssistError::InvalidSchema`]
    /// when the reply is not a valid object schema.
    pub async fn draft_schema(&self, prompt: &str) -> Result<String, AssistError> {
        let request = CompletionRequest::new(
            &self.model_id,
            SCHEMA_INSTRUCTION,
            format!("Create a Zod schema for: {prompt}\n\nReturn ONLY the schema code, no explanations."),
        );
        let text = self.model.complete(&request).await?;
        let schema = check_schema(&text)?;
        debug!(target: "schemalab::assist", chars = schema.len(), "drafted schema");
        Ok(schema)
    }

    /// Draft a matching system message and schema for `prompt`.
    ///
    /// # Errors
    ///
    /// [`AssistError::MissingField`] when the reply lacks either part, plus
    /// the errors of [`draft_schema`](Self::draft_schema).
    pub async fn draft_full_config(&self, prompt: &str) -> Result<ConfigDraft, AssistError> {
        let request = ExtractionRequest::new(
            &self.model_id,
            format!(
                "Create a complete AI configuration for: {prompt}\n\nGenerate both a system message and Zod schema that work together."
            ),
        )
        .with_system_instruction(FULL_CONFIG_INSTRUCTION)
        .with_schema_text(FULL_CONFIG_SCHEMA);

        let response = self.model.extract(&request).await?;
        let field = |name: &'static str| {
            response
                .object
                .get(name)
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .ok_or(AssistError::MissingField(name))
        };
        let system_message = field("systemMessage")?.trim().to_string();
        let schema = check_schema(&field("schema")?)?;

        info!(target: "schemalab::assist", model = %self.model_id, "drafted full config");
        Ok(ConfigDraft {
            system_message,
            schema,
        })
    }
}

fn check_schema(text: &str) -> Result<String, AssistError> {
    let schema = strip_code_fences(text);
    if !schema.starts_with("z.object") {
        return Err(AssistError::NotObjectSchema);
    }
    validate_schema_text(&schema)?;
    Ok(schema)
}

/// Remove a surrounding markdown code fence (with an optional language
/// tag) and trim.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
        .to_string()
}
