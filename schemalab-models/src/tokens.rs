//! Heuristic token counting.
//!
//! No tokenizer is bundled. The estimate takes the larger of a character-based
//! and a word-based guess, which errs on the high side for both prose and
//! dense JSON.

use serde::{Deserialize, Serialize};

/// Fixed per-request overhead for message framing.
pub const MESSAGE_OVERHEAD_TOKENS: u64 = 10;

const CHARS_PER_TOKEN: f64 = 4.0;
const TOKENS_PER_WORD: f64 = 1.3;

/// Estimate the token count of `text`. Blank text is zero tokens.
///
/// ```rust
/// use schemalab_models::estimate_tokens;
///
/// assert_eq!(estimate_tokens("   "), 0);
/// assert_eq!(estimate_tokens("hello world"), 3);
/// ```
#[must_use]
pub fn estimate_tokens(text: &str) -> u64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }
    let by_chars = (text.chars().count() as f64 / CHARS_PER_TOKEN).ceil();
    let by_words = (trimmed.split_whitespace().count() as f64 * TOKENS_PER_WORD).ceil();
    by_chars.max(by_words) as u64
}

/// Estimated prompt tokens of one generation, by part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBreakdown {
    /// Input text.
    pub input: u64,
    /// System message.
    pub system_message: u64,
    /// Schema text.
    pub schema: u64,
    /// Sum of the parts plus [`MESSAGE_OVERHEAD_TOKENS`].
    pub total: u64,
}

impl TokenBreakdown {
    /// Estimate every part of a request.
    #[must_use]
    pub fn compute(input: &str, system_message: &str, schema_text: &str) -> Self {
        let input = estimate_tokens(input);
        let system_message = estimate_tokens(system_message);
        let schema = estimate_tokens(schema_text);
        Self {
            input,
            system_message,
            schema,
            total: input + system_message + schema + MESSAGE_OVERHEAD_TOKENS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", 0)]
    #[case("\n\t ", 0)]
    #[case("a", 2)]
    #[case("abcdefgh", 2)]
    #[case("one two three four", 6)]
    #[case("supercalifragilistic", 5)]
    fn test_estimate_tokens(#[case] text: &str, #[case] expected: u64) {
        assert_eq!(estimate_tokens(text), expected);
    }

    #[test]
    fn test_breakdown_adds_overhead() {
        let b = TokenBreakdown::compute("hello world", "", "z.object({})");
        assert_eq!(b.input, 3);
        assert_eq!(b.system_message, 0);
        assert_eq!(b.schema, 3);
        assert_eq!(b.total, 16);
    }

    #[test]
    fn test_breakdown_of_nothing_is_overhead() {
        assert_eq!(TokenBreakdown::compute("", "", "").total, MESSAGE_OVERHEAD_TOKENS);
    }
}
