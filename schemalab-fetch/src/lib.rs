//! # schemalab-fetch
//!
//! The HTTP collaborator used to resolve fetch inputs into text.
//!
//! - [`FetchRequestConfig`]: what to request (URL, method, headers, body, timeout)
//! - [`HttpClient`]: the collaborator trait
//! - [`ReqwestHttpClient`]: the real client, with timeouts enforced by a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken)
//! - [`StaticHttpClient`]: canned responses for tests and demos
//!
//! ## Example
//!
//! ```rust,no_run
//! use schemalab_fetch::{FetchRequestConfig, HttpClient, HttpMethod, ReqwestHttpClient};
//!
//! # async fn run() -> Result<(), schemalab_fetch::FetchError> {
//! let client = ReqwestHttpClient::new();
//! let config = FetchRequestConfig::get("https://pokeapi.co/api/v2/pokemon/pikachu")
//!     .with_header("Accept", "application/json")
//!     .with_timeout_ms(10_000);
//! let body = client.request(&config).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod mock;

pub use client::{HttpClient, ReqwestHttpClient};
pub use config::{FetchRequestConfig, HttpMethod};
pub use error::FetchError;
pub use mock::StaticHttpClient;

/// Shared HTTP client handle.
pub type BoxedHttpClient = std::sync::Arc<dyn HttpClient>;
