//! OpenAI implementation of the extraction model.
//!
//! ```rust,no_run
//! use schemalab_models::openai::OpenAIChatModel;
//! use schemalab_models::{ExtractionModel, ExtractionRequest};
//!
//! # async fn run() -> Result<(), schemalab_models::ModelError> {
//! let model = OpenAIChatModel::from_env()?;
//! let request = ExtractionRequest::new("gpt-4.1-nano", "Vercel is a platform for frontend developers.")
//!     .with_system_instruction("Extract structured data.")
//!     .with_schema_text("z.object({ summary: z.string() })");
//! let response = model.extract(&request).await?;
//! println!("{}", response.object);
//! # Ok(())
//! # }
//! ```

pub mod chat;
pub mod types;

pub use chat::OpenAIChatModel;
pub use types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat, Usage};
