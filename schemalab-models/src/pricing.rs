//! Model pricing and capability lookup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Pricing and limits of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model id as sent to the provider.
    pub id: String,
    /// USD per million input tokens.
    pub input_cost_per_million: f64,
    /// USD per million output tokens.
    pub output_cost_per_million: f64,
    /// Context window in tokens.
    pub max_context_tokens: u64,
    /// Maximum completion tokens.
    pub max_output_tokens: u64,
    /// Training data cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_cutoff: Option<NaiveDate>,
    /// Whether the model is a reasoning model.
    #[serde(default)]
    pub supports_reasoning: bool,
}

impl ModelInfo {
    /// Create a model entry.
    pub fn new(
        id: impl Into<String>,
        input_cost_per_million: f64,
        output_cost_per_million: f64,
        max_context_tokens: u64,
        max_output_tokens: u64,
    ) -> Self {
        Self {
            id: id.into(),
            input_cost_per_million,
            output_cost_per_million,
            max_context_tokens,
            max_output_tokens,
            knowledge_cutoff: None,
            supports_reasoning: false,
        }
    }

    /// Set the knowledge cutoff.
    #[must_use]
    pub fn with_knowledge_cutoff(mut self, year: i32, month: u32, day: u32) -> Self {
        self.knowledge_cutoff = NaiveDate::from_ymd_opt(year, month, day);
        self
    }

    /// Mark as a reasoning model.
    #[must_use]
    pub fn with_reasoning(mut self) -> Self {
        self.supports_reasoning = true;
        self
    }

    /// Cost in USD of `tokens` input tokens.
    #[must_use]
    pub fn input_cost(&self, tokens: u64) -> f64 {
        tokens as f64 / 1_000_000.0 * self.input_cost_per_million
    }

    /// Cost in USD of `tokens` output tokens.
    #[must_use]
    pub fn output_cost(&self, tokens: u64) -> f64 {
        tokens as f64 / 1_000_000.0 * self.output_cost_per_million
    }
}

/// Source of model pricing.
pub trait PricingOracle: Send + Sync {
    /// Every known model.
    fn models(&self) -> Vec<ModelInfo>;

    /// Look up one model by id.
    fn lookup(&self, model_id: &str) -> Option<ModelInfo> {
        self.models().into_iter().find(|m| m.id == model_id)
    }
}

/// Shared pricing handle.
pub type BoxedPricingOracle = Arc<dyn PricingOracle>;

/// A fixed table of models.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelCatalog {
    models: Vec<ModelInfo>,
}

impl ModelCatalog {
    /// Create a catalog from entries.
    #[must_use]
    pub fn new(models: Vec<ModelInfo>) -> Self {
        Self { models }
    }

    /// Add or replace an entry.
    #[must_use]
    pub fn with_model(mut self, info: ModelInfo) -> Self {
        match self.models.iter_mut().find(|m| m.id == info.id) {
            Some(existing) => *existing = info,
            None => self.models.push(info),
        }
        self
    }

    /// Ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.id.as_str())
    }

    /// OpenAI chat models with published per-million-token prices.
    #[must_use]
    pub fn openai() -> Self {
        Self::new(vec![
            ModelInfo::new("gpt-4.1", 2.0, 8.0, 1_047_576, 32_768).with_knowledge_cutoff(2024, 6, 1),
            ModelInfo::new("gpt-4.1-mini", 0.4, 1.6, 1_047_576, 32_768)
                .with_knowledge_cutoff(2024, 6, 1),
            ModelInfo::new("gpt-4.1-nano", 0.1, 0.4, 1_047_576, 32_768)
                .with_knowledge_cutoff(2024, 6, 1),
            ModelInfo::new("gpt-4.5-preview", 75.0, 150.0, 128_000, 16_384)
                .with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("o3", 2.0, 8.0, 200_000, 100_000)
                .with_knowledge_cutoff(2024, 6, 1)
                .with_reasoning(),
            ModelInfo::new("o3-pro", 20.0, 80.0, 200_000, 100_000)
                .with_knowledge_cutoff(2024, 6, 1)
                .with_reasoning(),
            ModelInfo::new("o3-mini", 1.1, 4.4, 200_000, 100_000).with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("o4-mini", 0.6, 2.4, 200_000, 100_000).with_knowledge_cutoff(2024, 6, 1),
            ModelInfo::new("o1", 15.0, 60.0, 200_000, 100_000).with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("o1-mini", 1.1, 4.4, 128_000, 65_536)
                .with_knowledge_cutoff(2023, 10, 1)
                .with_reasoning(),
            ModelInfo::new("gpt-4o", 2.5, 10.0, 128_000, 16_384).with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("gpt-4o-2024-11-20", 2.5, 10.0, 128_000, 16_384)
                .with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("gpt-4o-2024-08-06", 2.5, 10.0, 128_000, 16_384)
                .with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("gpt-4o-2024-05-13", 5.0, 15.0, 128_000, 4_096)
                .with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("o4-mini-2025-04-16", 0.15, 0.6, 128_000, 16_384)
                .with_knowledge_cutoff(2023, 10, 1),
            ModelInfo::new("chatgpt-4o-latest", 5.0, 15.0, 128_000, 16_384)
                .with_knowledge_cutoff(2023, 10, 1),
        ])
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::openai()
    }
}

impl PricingOracle for ModelCatalog {
    fn models(&self) -> Vec<ModelInfo> {
        self.models.clone()
    }

    fn lookup(&self, model_id: &str) -> Option<ModelInfo> {
        self.models.iter().find(|m| m.id == model_id).cloned()
    }
}
