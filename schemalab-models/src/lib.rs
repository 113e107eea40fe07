//! # schemalab-models
//!
//! The model side of schemalab:
//!
//! - [`ExtractionModel`]: the LLM collaborator trait, with an OpenAI
//!   implementation ([`openai::OpenAIChatModel`]) and test doubles
//!   ([`MockModel`], [`FunctionModel`])
//! - [`PricingOracle`]: model pricing and limits, with the static
//!   [`ModelCatalog`]
//! - [`estimate_tokens`] and [`TokenBreakdown`]: heuristic token counts
//! - [`estimate_cost`], [`calculate_actual_cost`]: cost accounting and the
//!   context-window guard
//!
//! ## Example
//!
//! ```rust
//! use schemalab_models::{
//!     estimate_cost, estimate_output_tokens, format_cost, ModelCatalog, TokenBreakdown,
//! };
//!
//! let catalog = ModelCatalog::default();
//! let tokens = TokenBreakdown::compute(
//!     "Vercel is a platform for frontend developers.",
//!     "Extract structured data.",
//!     "z.object({ summary: z.string() })",
//! );
//! let output = estimate_output_tokens(tokens.total, true);
//! let estimate = estimate_cost(&catalog, tokens.total, output, "gpt-4.1-nano");
//! assert!(!estimate.exceeds_max_tokens);
//! assert_eq!(format_cost(estimate.total_estimated_cost), "<$0.001");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod cost;
pub mod error;
pub mod mock;
pub mod model;
pub mod openai;
pub mod pricing;
pub mod tokens;

pub use cost::{
    calculate_actual_cost, estimate_cost, estimate_output_tokens, format_cost,
    should_warn_about_cost, ActualCost, CostEstimate, CostInfo,
};
pub use error::{ModelError, ModelResult};
pub use mock::{FunctionModel, MockModel};
pub use model::{
    ensure_conforms, BoxedModel, CompletionRequest, ExtractionModel, ExtractionRequest,
    ExtractionResponse,
};
pub use openai::OpenAIChatModel;
pub use pricing::{BoxedPricingOracle, ModelCatalog, ModelInfo, PricingOracle};
pub use tokens::{estimate_tokens, TokenBreakdown, MESSAGE_OVERHEAD_TOKENS};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::cost::{estimate_cost, CostInfo};
    pub use crate::error::{ModelError, ModelResult};
    pub use crate::model::{BoxedModel, ExtractionModel, ExtractionRequest, ExtractionResponse};
    pub use crate::pricing::{ModelCatalog, PricingOracle};
    pub use crate::tokens::TokenBreakdown;
}
