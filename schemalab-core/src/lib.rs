//! # schemalab-core
//!
//! Foundational types shared by every schemalab crate:
//!
//! - **Identifiers**: type-safe ids for cards, schema fields and generation records
//! - **Usage**: token usage reported by the model and the estimate it is compared against
//! - **Errors**: the generation error taxonomy stored on records, and the
//!   [`LabError`] returned by workbench operations
//!
//! ## Example
//!
//! ```rust
//! use schemalab_core::{CardId, GenerationError, RequestUsage, TokenUsage};
//!
//! let card = CardId::new();
//! assert!(card.as_str().starts_with("card_"));
//!
//! let usage = RequestUsage::with_tokens(120, 40);
//! let tokens = TokenUsage::from_reported(150, Some(&usage));
//! assert_eq!(tokens.actual_input_tokens, Some(120));
//!
//! let err = GenerationError::EmptyInput;
//! assert!(!err.is_retryable());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod errors;
pub mod identifier;
pub mod usage;

pub use errors::{GenerationError, LabError, LabResult, SchemaIssue};
pub use identifier::{now_utc, CardId, FieldId, RecordId};
pub use usage::{RequestUsage, TokenUsage};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::errors::{GenerationError, LabError, LabResult, SchemaIssue};
    pub use crate::identifier::{CardId, FieldId, RecordId};
    pub use crate::usage::{RequestUsage, TokenUsage};
}
