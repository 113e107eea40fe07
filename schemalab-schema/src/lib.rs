//! # schemalab-schema
//!
//! The output-schema half of schemalab.
//!
//! An extraction schema exists in two shapes:
//!
//! - a tree of [`SchemaField`]s edited by the field builder, and
//! - *schema text*: the `z.object({ ... })` constructor-call notation the model
//!   collaborator understands.
//!
//! This crate converts between them and guards the text form:
//!
//! - [`render_schema`]: fields → canonical schema text (total, deterministic)
//! - [`parse_schema`]: schema text → fields (best effort, never fails)
//! - [`parse_schema_exact`]: schema text → fields, or `None` if any of it would be lost
//! - [`validate_schema_text`]: cheap structural gate run before any remote call
//! - [`to_json_schema`]: fields → JSON Schema for structured-output APIs
//! - [`check_value`]: generated JSON value → per-field [`SchemaIssue`]s
//!
//! Schema text is only ever tokenized. Nothing here evaluates it.
//!
//! ## Example
//!
//! ```rust
//! use schemalab_schema::{parse_schema, render_schema, validate_schema_text, SchemaField};
//!
//! let fields = vec![SchemaField::string("summary").with_description("desc")];
//! let text = render_schema(&fields);
//! assert_eq!(text, "z.object({\n  summary: z.string().describe(\"desc\")\n})");
//! assert!(validate_schema_text(&text).is_ok());
//!
//! let parsed = parse_schema(&text);
//! assert_eq!(parsed[0].name, "summary");
//! assert_eq!(parsed[0].description, "desc");
//! ```
//!
//! [`SchemaIssue`]: schemalab_core::SchemaIssue

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod conformance;
pub mod field;
pub mod json_schema;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod validator;

pub use conformance::check_value;
pub use field::{
    default_schema_fields, ArrayElement, ArrayElementType, FieldKind, FieldType, FieldUpdate,
    SchemaField,
};
pub use json_schema::to_json_schema;
pub use parser::{can_parse_schema, parse_schema, parse_schema_exact};
pub use render::{render_schema, EMPTY_SCHEMA, ENUM_PLACEHOLDER};
pub use validator::{is_valid_schema_text, validate_schema_text, SchemaTextError};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::field::{ArrayElement, FieldKind, FieldType, FieldUpdate, SchemaField};
    pub use crate::parser::{can_parse_schema, parse_schema, parse_schema_exact};
    pub use crate::render::render_schema;
    pub use crate::validator::{validate_schema_text, SchemaTextError};
}
