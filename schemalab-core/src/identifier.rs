//! ID generation utilities.
//!
//! Cards, schema fields and generation records are identified by opaque,
//! prefixed UUID strings. The newtypes below keep them from being mixed up.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a unique card ID.
///
/// # Example
///
/// ```rust
/// use schemalab_core::identifier::generate_card_id;
///
/// let id = generate_card_id();
/// assert!(id.starts_with("card_"));
/// assert_eq!(id.len(), 37); // "card_" + 32 hex chars
/// ```
#[must_use]
pub fn generate_card_id() -> String {
    format!("card_{}", Uuid::new_v4().simple())
}

/// Generate a unique schema field ID.
#[must_use]
pub fn generate_field_id() -> String {
    format!("field_{}", Uuid::new_v4().simple())
}

/// Generate a unique generation record ID.
#[must_use]
pub fn generate_record_id() -> String {
    format!("out_{}", Uuid::new_v4().simple())
}

/// Get the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $generate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a fresh, unique ID.
            #[must_use]
            pub fn new() -> Self {
                Self($generate())
            }

            /// Create from an existing string.
            #[must_use]
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Type-safe wrapper for an input or generator card ID.
    CardId,
    generate_card_id
);

define_id!(
    /// Type-safe wrapper for a schema field ID.
    ///
    /// Only unique within a schema tree; the parser mints fresh ones on every call.
    FieldId,
    generate_field_id
);

define_id!(
    /// Type-safe wrapper for a generation record ID.
    RecordId,
    generate_record_id
);
