//! Structural validation of schema text.
//!
//! A conservative syntactic gate run before schema text is accepted or sent to
//! the model. Passing it does not mean the model will accept the schema.

use crate::lexer::{tokenize, Token};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Why schema text was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchemaTextError {
    /// The text does not start with the `z.` namespace.
    #[error("Schema must start with 'z.'")]
    MissingNamespace,
    /// A `.max()` constraint was found.
    #[error("Schema cannot contain .max() - this constraint is not allowed")]
    ForbiddenConstraint,
    /// Parentheses do not balance.
    #[error("Unbalanced parentheses in schema")]
    UnbalancedParentheses,
    /// Braces do not balance.
    #[error("Unbalanced braces in schema")]
    UnbalancedBraces,
    /// None of the known constructors appear.
    #[error("Schema doesn't contain valid Zod types")]
    NoRecognizedTypes,
}

fn max_call() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.max\s*\(").expect("valid regex"))
}

fn known_constructor() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"z\.(object|string|number|boolean|array|enum|union|literal|optional|nullable)")
            .expect("valid regex")
    })
}

/// Validate schema text. Checks run in order and stop at the first failure:
/// namespace prefix, forbidden `.max()`, bracket balance (outside string
/// literals), known constructor vocabulary.
///
/// ```rust
/// use schemalab_schema::{validate_schema_text, SchemaTextError};
///
/// assert!(validate_schema_text("z.object({ a: z.string() })").is_ok());
/// assert_eq!(
///     validate_schema_text("z.object({ a: z.string().max(5) })"),
///     Err(SchemaTextError::ForbiddenConstraint),
/// );
/// ```
pub fn validate_schema_text(text: &str) -> Result<(), SchemaTextError> {
    if !text.trim().starts_with("z.") {
        return Err(SchemaTextError::MissingNamespace);
    }
    if max_call().is_match(text) {
        return Err(SchemaTextError::ForbiddenConstraint);
    }

    let (mut parens, mut braces) = (0i64, 0i64);
    for token in tokenize(text) {
        match token {
            Token::LParen => parens += 1,
            Token::RParen => parens -= 1,
            Token::LBrace => braces += 1,
            Token::RBrace => braces -= 1,
            _ => {}
        }
    }
    if parens != 0 {
        return Err(SchemaTextError::UnbalancedParentheses);
    }
    if braces != 0 {
        return Err(SchemaTextError::UnbalancedBraces);
    }

    if !known_constructor().is_match(text) {
        return Err(SchemaTextError::NoRecognizedTypes);
    }
    Ok(())
}

/// Whether [`validate_schema_text`] accepts the text.
#[must_use]
pub fn is_valid_schema_text(text: &str) -> bool {
    validate_schema_text(text).is_ok()
}
