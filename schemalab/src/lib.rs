//! # SchemaLab - Structured Extraction Workbench for Rust
//!
//! SchemaLab lets you compose, version and test LLM structured-extraction
//! setups. An *input card* holds the text to extract from (typed in, or the
//! body of an HTTP request). A *generator card* holds the model, the system
//! message and an output schema written as Zod-style schema text. Each run
//! produces a *generation record* pinned to the exact input and generator
//! versions it consumed, with token and cost accounting.
//!
//! ## Quick Start
//!
//! ```ignore
//! use schemalab::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WorkbenchConfig::from_env()?;
//!     let model = Arc::new(config.openai_model()?);
//!     let workbench = Workbench::new(config).into_shared();
//!     let generator = workbench.read().generators()[0].id().clone();
//!
//!     let orchestrator = Orchestrator::new(workbench.clone(), model);
//!     let record_id = orchestrator.generate(&generator).await?;
//!
//!     let wb = workbench.read();
//!     println!("{:?}", wb.record(&record_id).and_then(|r| r.value()));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`schemalab_core`] - Identifiers, token usage and error taxonomy
//! - [`schemalab_schema`] - Schema field model, renderer, parser, validator
//! - [`schemalab_fetch`] - HTTP collaborator for fetch inputs
//! - [`schemalab_cards`] - Versioned input and generator cards
//! - [`schemalab_models`] - LLM collaborator, pricing table, cost estimator
//!
//! This crate adds the [`Workbench`] state, the generation [`Orchestrator`]
//! and the [`ConfigAssistant`].

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod assist;
pub mod config;
pub mod orchestrator;
pub mod output;
pub mod state;

pub use schemalab_cards as cards;
pub use schemalab_core as core;
pub use schemalab_fetch as fetch;
pub use schemalab_models as models;
pub use schemalab_schema as schema;

pub use assist::{strip_code_fences, AssistError, ConfigAssistant, ConfigDraft};
pub use config::{ConfigError, WorkbenchConfig};
pub use orchestrator::{Launch, Orchestrator, PendingGeneration};
pub use output::{GenerationRecord, GenerationReference, GenerationStatus};
pub use state::{SharedWorkbench, Workbench};

pub use schemalab_cards::{
    GeneratorCard, GeneratorConfig, InputCard, InputConfig, InputKind, SchemaSource,
    VersionPointer, VersionedEntity,
};
pub use schemalab_core::{
    CardId, GenerationError, LabError, LabResult, RecordId, RequestUsage, SchemaIssue, TokenUsage,
};
pub use schemalab_fetch::{FetchError, FetchRequestConfig, HttpClient, HttpMethod};
pub use schemalab_models::{
    CostInfo, ExtractionModel, ModelCatalog, ModelError, OpenAIChatModel, PricingOracle,
    TokenBreakdown,
};
pub use schemalab_schema::{
    parse_schema, parse_schema_exact, render_schema, validate_schema_text, FieldKind, SchemaField,
    SchemaTextError,
};

/// Prelude for common imports.
///
/// ```rust
/// use schemalab::prelude::*;
///
/// let wb = Workbench::new(WorkbenchConfig::default());
/// assert_eq!(wb.inputs().len(), 1);
/// ```
pub mod prelude {
    pub use crate::assist::{ConfigAssistant, ConfigDraft};
    pub use crate::config::WorkbenchConfig;
    pub use crate::orchestrator::Orchestrator;
    pub use crate::output::{GenerationRecord, GenerationStatus};
    pub use crate::state::{SharedWorkbench, Workbench};
    pub use schemalab_cards::{GeneratorConfig, InputKind, VersionPointer};
    pub use schemalab_core::prelude::*;
    pub use schemalab_fetch::FetchRequestConfig;
    pub use schemalab_models::prelude::*;
    pub use schemalab_schema::SchemaField;
}
