//! Token usage accounting.
//!
//! [`RequestUsage`] is what a model reports for one call. [`TokenUsage`] is what a
//! generation record keeps: the pre-flight estimate next to the reported counts.

use serde::{Deserialize, Serialize};

/// Token usage reported by a model for a single request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUsage {
    /// Number of tokens in the prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_tokens: Option<u64>,
    /// Number of tokens in the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_tokens: Option<u64>,
    /// Total tokens (request + response).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl RequestUsage {
    /// Create a new empty usage record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create usage with request and response tokens.
    #[must_use]
    pub fn with_tokens(request_tokens: u64, response_tokens: u64) -> Self {
        Self {
            request_tokens: Some(request_tokens),
            response_tokens: Some(response_tokens),
            total_tokens: Some(request_tokens + response_tokens),
        }
    }

    /// Set the total explicitly (providers sometimes report a total that
    /// is not the plain sum).
    #[must_use]
    pub fn total_tokens(mut self, tokens: u64) -> Self {
        self.total_tokens = Some(tokens);
        self
    }

    /// Total tokens, falling back to the sum of the parts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_tokens.unwrap_or_else(|| {
            self.request_tokens.unwrap_or(0) + self.response_tokens.unwrap_or(0)
        })
    }

    /// Whether any count was reported at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.request_tokens.is_none() && self.response_tokens.is_none() && self.total_tokens.is_none()
    }
}

/// Token accounting stored on a generation record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Input tokens estimated before the call.
    pub expected_input_tokens: u64,
    /// Prompt tokens reported by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_input_tokens: Option<u64>,
    /// Completion tokens reported by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Total tokens reported by the model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    /// Usage known before the call: only the estimate.
    #[must_use]
    pub fn estimated(expected_input_tokens: u64) -> Self {
        Self {
            expected_input_tokens,
            ..Self::default()
        }
    }

    /// Combine the estimate with whatever the model reported.
    #[must_use]
    pub fn from_reported(expected_input_tokens: u64, reported: Option<&RequestUsage>) -> Self {
        match reported {
            Some(usage) => Self {
                expected_input_tokens,
                actual_input_tokens: usage.request_tokens,
                output_tokens: usage.response_tokens,
                total_tokens: usage.total_tokens,
            },
            None => Self::estimated(expected_input_tokens),
        }
    }

    /// Signed difference between the reported and the estimated input tokens.
    #[must_use]
    pub fn estimate_drift(&self) -> Option<i64> {
        self.actual_input_tokens
            .map(|actual| actual as i64 - self.expected_input_tokens as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tokens_sets_total() {
        let usage = RequestUsage::with_tokens(100, 50);
        assert_eq!(usage.total_tokens, Some(150));
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn test_total_falls_back_to_sum() {
        let usage = RequestUsage {
            request_tokens: Some(7),
            response_tokens: Some(3),
            total_tokens: None,
        };
        assert_eq!(usage.total(), 10);
        assert!(RequestUsage::new().is_empty());
    }

    #[test]
    fn test_from_reported() {
        let reported = RequestUsage::with_tokens(90, 30);
        let usage = TokenUsage::from_reported(100, Some(&reported));
        assert_eq!(usage.actual_input_tokens, Some(90));
        assert_eq!(usage.output_tokens, Some(30));
        assert_eq!(usage.total_tokens, Some(120));
        assert_eq!(usage.estimate_drift(), Some(-10));
    }

    #[test]
    fn test_from_reported_without_usage() {
        let usage = TokenUsage::from_reported(42, None);
        assert_eq!(usage, TokenUsage::estimated(42));
        assert_eq!(usage.estimate_drift(), None);
    }

    #[test]
    fn test_serde_skips_unreported() {
        let usage = TokenUsage::estimated(5);
        let json = serde_json::to_value(&usage).unwrap();
        assert_eq!(json, serde_json::json!({ "expected_input_tokens": 5 }));
    }
}
