//! Generation records.
//!
//! A record is inserted in the `Loading` state before the model is called
//! and moves exactly once to `Succeeded` or `Failed`.

use chrono::{DateTime, Utc};
use schemalab_cards::GeneratorConfig;
use schemalab_core::{now_utc, CardId, GenerationError, RecordId, TokenUsage};
use schemalab_models::{CostInfo, TokenBreakdown};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Lifecycle of a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationStatus {
    /// Waiting on the model.
    Loading,
    /// The model returned a conforming value.
    Succeeded {
        /// Generated value.
        value: JsonValue,
    },
    /// The attempt failed.
    Failed {
        /// Why.
        error: GenerationError,
    },
}

impl GenerationStatus {
    /// Whether this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading)
    }
}

/// Exactly what a generation consumed. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReference {
    /// Input card id.
    pub input_card_id: CardId,
    /// Input snapshot used.
    pub input_version: u32,
    /// Generator card id.
    pub generator_card_id: CardId,
    /// Generator snapshot used.
    pub generator_version: u32,
    /// Input text as sent.
    pub input_data: String,
    /// Generator config as sent.
    pub generator_config: GeneratorConfig,
}

/// One generation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Record id.
    pub id: RecordId,
    /// Generator that produced it.
    pub generator_id: CardId,
    #[serde(flatten)]
    status: GenerationStatus,
    /// Frozen input and generator versions. Absent when the attempt failed
    /// before they were resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_reference: Option<GenerationReference>,
    /// Estimated token counts per prompt part.
    #[serde(default)]
    pub token_breakdown: TokenBreakdown,
    /// Expected and reported token counts.
    #[serde(default)]
    pub token_usage: TokenUsage,
    /// Estimated and actual cost.
    #[serde(default)]
    pub cost_info: CostInfo,
    /// Wall-clock time of the model call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time_ms: Option<u64>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    fn with_status(generator_id: CardId, status: GenerationStatus) -> Self {
        Self {
            id: RecordId::new(),
            generator_id,
            status,
            generation_reference: None,
            token_breakdown: TokenBreakdown::default(),
            token_usage: TokenUsage::default(),
            cost_info: CostInfo::default(),
            generation_time_ms: None,
            created_at: now_utc(),
        }
    }

    /// A record waiting on the model.
    pub fn loading(generator_id: CardId) -> Self {
        Self::with_status(generator_id, GenerationStatus::Loading)
    }

    /// A record that failed before the model was called.
    pub fn failed(generator_id: CardId, error: GenerationError) -> Self {
        Self::with_status(generator_id, GenerationStatus::Failed { error })
    }

    /// Attach the generation reference.
    #[must_use]
    pub fn with_reference(mut self, reference: GenerationReference) -> Self {
        self.generation_reference = Some(reference);
        self
    }

    /// Attach the token breakdown.
    #[must_use]
    pub fn with_token_breakdown(mut self, breakdown: TokenBreakdown) -> Self {
        self.token_breakdown = breakdown;
        self
    }

    /// Attach token usage.
    #[must_use]
    pub fn with_token_usage(mut self, usage: TokenUsage) -> Self {
        self.token_usage = usage;
        self
    }

    /// Attach cost info.
    #[must_use]
    pub fn with_cost_info(mut self, cost_info: CostInfo) -> Self {
        self.cost_info = cost_info;
        self
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    /// Whether the model call is still outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.status, GenerationStatus::Loading)
    }

    /// The generated value, when succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&JsonValue> {
        match &self.status {
            GenerationStatus::Succeeded { value } => Some(value),
            _ => None,
        }
    }

    /// The failure, when failed.
    #[must_use]
    pub fn error(&self) -> Option<&GenerationError> {
        match &self.status {
            GenerationStatus::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Move from `Loading` to `Succeeded`. Returns false, leaving the
    /// record untouched, when it is already terminal.
    pub fn succeed(&mut self, value: JsonValue) -> bool {
        self.transition(GenerationStatus::Succeeded { value })
    }

    /// Move from `Loading` to `Failed`. Returns false, leaving the record
    /// untouched, when it is already terminal.
    pub fn fail(&mut self, error: GenerationError) -> bool {
        self.transition(GenerationStatus::Failed { error })
    }

    fn transition(&mut self, next: GenerationStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_single_transition() {
        let mut record = GenerationRecord::loading(CardId::from("gen_1"));
        assert!(record.is_loading());

        assert!(record.succeed(json!({ "summary": "ok" })));
        assert_eq!(record.value(), Some(&json!({ "summary": "ok" })));

        assert!(!record.fail(GenerationError::EmptyInput));
        assert!(!record.succeed(json!({})));
        assert_eq!(record.value(), Some(&json!({ "summary": "ok" })));
        assert!(record.error().is_none());
    }

    #[test]
    fn test_failed_is_terminal() {
        let mut record = GenerationRecord::failed(CardId::from("gen_1"), GenerationError::NoActiveInput);
        assert_eq!(record.error(), Some(&GenerationError::NoActiveInput));
        assert!(!record.succeed(json!({})));
        assert!(record.generation_reference.is_none());
    }

    #[test]
    fn test_serde_flattens_status() {
        let mut record = GenerationRecord::loading(CardId::from("gen_1"));
        record.fail(GenerationError::fetch("timed out", true));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"]["kind"], "fetch_resolution_failed");

        let back: GenerationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
