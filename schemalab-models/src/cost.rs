//! Cost estimation, actual cost, and the context-window guard.

use crate::pricing::PricingOracle;
use schemalab_core::TokenUsage;
use serde::{Deserialize, Serialize};

/// How many cheaper alternatives to suggest when a prompt does not fit.
pub const MAX_SUGGESTED_ALTERNATIVES: usize = 3;

/// Cost at or above which callers should warn before spending.
pub const COST_WARNING_THRESHOLD: f64 = 1.0;

/// Pre-flight estimate for one generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    /// Estimated input cost in USD.
    pub input_cost: f64,
    /// Estimated output cost in USD.
    pub estimated_output_cost: f64,
    /// Sum of both.
    pub total_estimated_cost: f64,
    /// Context window of the model, when it is known.
    pub max_context_tokens: Option<u64>,
    /// Whether the input does not fit the context window.
    pub exceeds_max_tokens: bool,
    /// Models that would fit, cheapest input first.
    pub suggested_alternatives: Vec<String>,
}

/// Cost computed from reported usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActualCost {
    /// Input cost in USD.
    pub input_cost: f64,
    /// Output cost in USD.
    pub output_cost: f64,
    /// Sum of both.
    pub total_cost: f64,
}

/// Cost figures stored on a generation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostInfo {
    /// Estimated total cost.
    pub estimated_cost: f64,
    /// Cost from reported usage, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_cost: Option<f64>,
    /// Estimated input cost.
    pub input_cost: f64,
    /// Output cost from reported usage, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_cost: Option<f64>,
    /// Whether the prompt exceeded the context window.
    pub exceeds_max_tokens: bool,
    /// Suggested model ids when it did.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_alternatives: Vec<String>,
}

impl CostInfo {
    /// Record what was known before the call.
    #[must_use]
    pub fn from_estimate(estimate: &CostEstimate) -> Self {
        Self {
            estimated_cost: estimate.total_estimated_cost,
            actual_cost: None,
            input_cost: estimate.input_cost,
            output_cost: None,
            exceeds_max_tokens: estimate.exceeds_max_tokens,
            suggested_alternatives: estimate.suggested_alternatives.clone(),
        }
    }

    /// Add the actual cost, if any.
    #[must_use]
    pub fn with_actual(mut self, actual: Option<&ActualCost>) -> Self {
        self.actual_cost = actual.map(|a| a.total_cost);
        self.output_cost = actual.map(|a| a.output_cost);
        self
    }

    /// The best known cost: actual when reported, else the estimate.
    #[must_use]
    pub fn display_cost(&self) -> f64 {
        self.actual_cost.unwrap_or(self.estimated_cost)
    }
}

/// Estimate the cost of sending `input_tokens` and receiving `output_tokens`.
///
/// An unknown model yields a zero estimate that never exceeds.
#[must_use]
pub fn estimate_cost(
    oracle: &dyn PricingOracle,
    input_tokens: u64,
    output_tokens: u64,
    model_id: &str,
) -> CostEstimate {
    let Some(model) = oracle.lookup(model_id) else {
        tracing::debug!(target: "schemalab::models::cost", model = model_id, "unknown model, no estimate");
        return CostEstimate::default();
    };

    let input_cost = model.input_cost(input_tokens);
    let estimated_output_cost = model.output_cost(output_tokens);
    let exceeds_max_tokens = input_tokens > model.max_context_tokens;

    let suggested_alternatives = if exceeds_max_tokens {
        let mut fitting: Vec<_> = oracle
            .models()
            .into_iter()
            .filter(|m| m.max_context_tokens > input_tokens && m.id != model_id)
            .collect();
        fitting.sort_by(|a, b| a.input_cost_per_million.total_cmp(&b.input_cost_per_million));
        fitting
            .into_iter()
            .take(MAX_SUGGESTED_ALTERNATIVES)
            .map(|m| m.id)
            .collect()
    } else {
        Vec::new()
    };

    CostEstimate {
        input_cost,
        estimated_output_cost,
        total_estimated_cost: input_cost + estimated_output_cost,
        max_context_tokens: Some(model.max_context_tokens),
        exceeds_max_tokens,
        suggested_alternatives,
    }
}

/// Cost from reported usage. `None` for unknown models or when either count
/// is missing or zero.
#[must_use]
pub fn calculate_actual_cost(
    oracle: &dyn PricingOracle,
    usage: &TokenUsage,
    model_id: &str,
) -> Option<ActualCost> {
    let model = oracle.lookup(model_id)?;
    let input = usage.actual_input_tokens.filter(|&t| t > 0)?;
    let output = usage.output_tokens.filter(|&t| t > 0)?;

    let input_cost = model.input_cost(input);
    let output_cost = model.output_cost(output);
    Some(ActualCost {
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
    })
}

/// Expected completion size. Structured output is short and bounded; free
/// text tends to track the input.
#[must_use]
pub fn estimate_output_tokens(input_tokens: u64, has_schema: bool) -> u64 {
    let input = input_tokens as f64;
    let estimate = if has_schema {
        (input * 0.3).clamp(50.0, 4000.0)
    } else {
        (input * 0.8).min(8000.0)
    };
    estimate.round() as u64
}

/// Format a USD amount for display.
///
/// ```rust
/// use schemalab_models::format_cost;
///
/// assert_eq!(format_cost(0.0004), "<$0.001");
/// assert_eq!(format_cost(0.01234), "$0.012");
/// ```
#[must_use]
pub fn format_cost(cost: f64) -> String {
    if cost < 0.001 {
        "<$0.001".to_string()
    } else {
        format!("${cost:.3}")
    }
}

/// Whether a cost is high enough to warn about.
#[must_use]
pub fn should_warn_about_cost(cost: f64) -> bool {
    cost >= COST_WARNING_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{ModelCatalog, ModelInfo};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn small_catalog() -> ModelCatalog {
        ModelCatalog::new(vec![
            ModelInfo::new("tiny", 1.0, 2.0, 1000, 500),
            ModelInfo::new("big-expensive", 10.0, 20.0, 100_000, 4000),
            ModelInfo::new("big-cheap", 0.5, 1.0, 100_000, 4000),
            ModelInfo::new("mid", 2.0, 4.0, 2000, 1000),
            ModelInfo::new("also-small", 0.1, 0.2, 1200, 500),
        ])
    }

    #[test]
    fn test_unknown_model_is_free_and_fits() {
        let est = estimate_cost(&small_catalog(), 10_000_000, 100, "nope");
        assert_eq!(est, CostEstimate::default());
        assert!(!est.exceeds_max_tokens);
    }

    #[test]
    fn test_estimate_within_window() {
        let est = estimate_cost(&small_catalog(), 500, 100, "tiny");
        assert!((est.input_cost - 0.0005).abs() < 1e-12);
        assert!((est.estimated_output_cost - 0.0002).abs() < 1e-12);
        assert!((est.total_estimated_cost - 0.0007).abs() < 1e-12);
        assert!(!est.exceeds_max_tokens);
        assert!(est.suggested_alternatives.is_empty());
    }

    #[test]
    fn test_exceeding_suggests_cheapest_fitting() {
        let est = estimate_cost(&small_catalog(), 1500, 100, "tiny");
        assert!(est.exceeds_max_tokens);
        assert_eq!(est.max_context_tokens, Some(1000));
        assert_eq!(est.suggested_alternatives, vec!["big-cheap", "mid", "big-expensive"]);
    }

    #[test]
    fn test_boundary_is_not_exceeding() {
        let est = estimate_cost(&small_catalog(), 1000, 0, "tiny");
        assert!(!est.exceeds_max_tokens);
    }

    #[test]
    fn test_actual_cost_needs_both_counts() {
        let catalog = small_catalog();
        let mut usage = TokenUsage::estimated(100);
        assert_eq!(calculate_actual_cost(&catalog, &usage, "tiny"), None);

        usage.actual_input_tokens = Some(1_000_000);
        usage.output_tokens = Some(0);
        assert_eq!(calculate_actual_cost(&catalog, &usage, "tiny"), None);

        usage.output_tokens = Some(500_000);
        let cost = calculate_actual_cost(&catalog, &usage, "tiny").unwrap();
        assert!((cost.input_cost - 1.0).abs() < 1e-12);
        assert!((cost.output_cost - 1.0).abs() < 1e-12);
        assert!((cost.total_cost - 2.0).abs() < 1e-12);

        assert_eq!(calculate_actual_cost(&catalog, &usage, "nope"), None);
    }

    #[rstest]
    #[case(100, true, 50)]
    #[case(1000, true, 300)]
    #[case(100_000, true, 4000)]
    #[case(100, false, 80)]
    #[case(100_000, false, 8000)]
    #[case(0, false, 0)]
    fn test_estimate_output_tokens(#[case] input: u64, #[case] has_schema: bool, #[case] expected: u64) {
        assert_eq!(estimate_output_tokens(input, has_schema), expected);
    }

    #[rstest]
    #[case(0.0, "<$0.001")]
    #[case(0.000_999, "<$0.001")]
    #[case(0.001, "$0.001")]
    #[case(1.23456, "$1.235")]
    fn test_format_cost(#[case] cost: f64, #[case] expected: &str) {
        assert_eq!(format_cost(cost), expected);
    }

    #[test]
    fn test_warning_threshold() {
        assert!(!should_warn_about_cost(0.99));
        assert!(should_warn_about_cost(1.0));
    }

    #[test]
    fn test_cost_info_lifecycle() {
        let est = estimate_cost(&small_catalog(), 500, 100, "tiny");
        let info = CostInfo::from_estimate(&est);
        assert_eq!(info.actual_cost, None);
        assert_eq!(info.display_cost(), est.total_estimated_cost);

        let actual = ActualCost {
            input_cost: 0.1,
            output_cost: 0.2,
            total_cost: 0.3,
        };
        let info = info.with_actual(Some(&actual));
        assert_eq!(info.actual_cost, Some(0.3));
        assert_eq!(info.output_cost, Some(0.2));
        assert_eq!(info.display_cost(), 0.3);
    }
}
