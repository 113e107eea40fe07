//! # schemalab-cards
//!
//! Versioned entities for the extraction workbench.
//!
//! [`VersionedEntity`] is a store-independent commit / switch / revert state
//! machine over any cloneable, comparable draft. Two drafts are provided:
//!
//! - [`InputConfig`]: text to extract from, or a fetch request that produces it
//! - [`GeneratorConfig`]: model, system message and output schema
//!
//! ## Example
//!
//! ```rust
//! use schemalab_cards::{InputCard, VersionPointer};
//!
//! let mut card = InputCard::new_text("input", "hello");
//! assert!(!card.has_unsaved_changes());
//!
//! card.set_text("hello world").unwrap();
//! assert!(card.has_unsaved_changes());
//!
//! assert_eq!(card.commit(), 2);
//! assert_eq!(card.current(), VersionPointer::At(2));
//!
//! card.switch_to_version(1).unwrap();
//! assert_eq!(card.text(), Some("hello"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod generator;
pub mod input;
pub mod versioned;

pub use generator::{GeneratorCard, GeneratorConfig, SchemaSource};
pub use input::{InputCard, InputConfig, InputContent, InputKind};
pub use versioned::{Draft, VersionPointer, VersionSnapshot, VersionedEntity};
