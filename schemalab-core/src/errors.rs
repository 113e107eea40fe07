//! Error types for schemalab.
//!
//! Two families live here:
//!
//! - [`GenerationError`]: why a generation attempt failed. These are *data*: they are
//!   stored on the generation record and never propagate past the orchestrator.
//! - [`LabError`]: a caller asked the workbench for something that does not exist or
//!   is not allowed (unknown card, missing version, deleting the last input).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One structural violation found when checking a generated value against a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaIssue {
    /// Dotted path to the offending value (`actionItems.0.task`), empty for the root.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl SchemaIssue {
    /// Create a new issue.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Why a generation attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationError {
    /// The schema text did not pass the structural validator; nothing was sent.
    #[error("Invalid schema: {reason}")]
    SchemaTextInvalid {
        /// Validator reason.
        reason: String,
    },

    /// The model answered, but the value does not fit the schema.
    #[error("Schema validation failed: {}", format_issues(.issues))]
    SchemaSemanticRejection {
        /// Per-field violations.
        issues: Vec<SchemaIssue>,
        /// Pretty-printed copy of the generated value.
        generated_value: String,
    },

    /// Transport, auth, rate limit or API failure from the model collaborator.
    #[error("{message}")]
    RemoteCallFailure {
        /// User-facing message.
        message: String,
        /// Whether trying again later could succeed.
        retryable: bool,
    },

    /// Resolving a fetch input failed or timed out; no model call was made.
    #[error("Fetch failed: {message}")]
    FetchResolutionFailed {
        /// User-facing message.
        message: String,
        /// Whether the request was aborted by its timeout.
        timed_out: bool,
    },

    /// There is no active input card.
    #[error("No active input selected.")]
    NoActiveInput,

    /// The active input has no text.
    #[error("No data available for generation.")]
    EmptyInput,

    /// The estimated prompt does not fit the model's context window.
    #[error(
        "Estimated {estimated_tokens} input tokens exceeds the {max_context_tokens} token context window"
    )]
    ExceedsContextWindow {
        /// Estimated input tokens.
        estimated_tokens: u64,
        /// Model context window.
        max_context_tokens: u64,
        /// Cheaper models with a large enough context window.
        suggested_alternatives: Vec<String>,
    },
}

fn format_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl GenerationError {
    /// Create a schema-text error.
    pub fn schema_text(reason: impl Into<String>) -> Self {
        Self::SchemaTextInvalid {
            reason: reason.into(),
        }
    }

    /// Create a semantic rejection, pretty-printing the offending value.
    pub fn semantic_rejection(issues: Vec<SchemaIssue>, value: &serde_json::Value) -> Self {
        let generated_value =
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::SchemaSemanticRejection {
            issues,
            generated_value,
        }
    }

    /// Create a remote call failure.
    pub fn remote(message: impl Into<String>, retryable: bool) -> Self {
        Self::RemoteCallFailure {
            message: message.into(),
            retryable,
        }
    }

    /// Create a fetch failure.
    pub fn fetch(message: impl Into<String>, timed_out: bool) -> Self {
        Self::FetchResolutionFailed {
            message: message.into(),
            timed_out,
        }
    }

    /// Whether the same request could succeed if tried again unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteCallFailure { retryable, .. } => *retryable,
            Self::FetchResolutionFailed { timed_out, .. } => *timed_out,
            _ => false,
        }
    }

    /// Whether the error was detected before any collaborator was contacted.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::SchemaTextInvalid { .. }
                | Self::NoActiveInput
                | Self::EmptyInput
                | Self::ExceedsContextWindow { .. }
        )
    }

    /// Per-field issues, if this is a semantic rejection.
    #[must_use]
    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            Self::SchemaSemanticRejection { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// Errors returned by workbench operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabError {
    /// No card with this id.
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// The card has no snapshot with this version number.
    #[error("Version {version} not found for card {card_id}")]
    VersionNotFound {
        /// Card id.
        card_id: String,
        /// Requested version.
        version: u32,
    },

    /// The only remaining input card cannot be deleted.
    #[error("Cannot delete the last input card")]
    LastInputCard,

    /// An edit targeted the other input variant.
    #[error("Input card {card_id} is not a {expected} input")]
    InputKindMismatch {
        /// Card id.
        card_id: String,
        /// Variant the edit expected.
        expected: &'static str,
    },

    /// An edit would replace a draft with one of another variant.
    #[error("Card {card_id} cannot change its variant")]
    DraftVariantChanged {
        /// Card id.
        card_id: String,
    },

    /// No generation record with this id.
    #[error("Generation record not found: {0}")]
    RecordNotFound(String),

    /// The record has no successful result.
    #[error("Generation record {0} has no result")]
    NoResult(String),

    /// Schema text rejected by the validator.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A fetch input could not be resolved.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),
}

impl LabError {
    /// Create a card-not-found error.
    pub fn card_not_found(id: impl AsRef<str>) -> Self {
        Self::CardNotFound(id.as_ref().to_string())
    }

    /// Create a version-not-found error.
    pub fn version_not_found(card_id: impl AsRef<str>, version: u32) -> Self {
        Self::VersionNotFound {
            card_id: card_id.as_ref().to_string(),
            version,
        }
    }

    /// Create a draft-variant-changed error.
    pub fn draft_variant_changed(card_id: impl AsRef<str>) -> Self {
        Self::DraftVariantChanged {
            card_id: card_id.as_ref().to_string(),
        }
    }
}

/// Result type alias using [`LabError`].
pub type LabResult<T> = std::result::Result<T, LabError>;
