//! Input cards: the text a generation extracts from.

use crate::versioned::{Draft, VersionedEntity};
use schemalab_core::{LabError, LabResult};
use schemalab_fetch::FetchRequestConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two input variants. Fixed for the lifetime of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// Raw text.
    Text,
    /// An HTTP request whose response body becomes the text.
    Fetch,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Fetch => "fetch",
        })
    }
}

/// Variant-specific content of an input card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputContent {
    /// Raw text.
    Text {
        /// The text.
        data: String,
    },
    /// A fetch request.
    Fetch {
        /// Request configuration.
        fetch_config: FetchRequestConfig,
    },
}

/// Draft content of an input card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Display label.
    pub label: String,
    /// Variant content.
    #[serde(flatten)]
    pub content: InputContent,
}

impl InputConfig {
    /// Text input content.
    pub fn text(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: InputContent::Text { data: data.into() },
        }
    }

    /// Fetch input content.
    pub fn fetch(label: impl Into<String>, fetch_config: FetchRequestConfig) -> Self {
        Self {
            label: label.into(),
            content: InputContent::Fetch { fetch_config },
        }
    }

    /// Which variant this is.
    #[must_use]
    pub fn kind(&self) -> InputKind {
        match self.content {
            InputContent::Text { .. } => InputKind::Text,
            InputContent::Fetch { .. } => InputKind::Fetch,
        }
    }
}

impl Draft for InputConfig {
    fn admits(&self, next: &Self) -> bool {
        self.kind() == next.kind()
    }
}

/// A versioned input card. Its variant is fixed at creation: generic edits
/// that switch between text and fetch content are refused.
pub type InputCard = VersionedEntity<InputConfig>;

impl VersionedEntity<InputConfig> {
    /// Create a text card.
    pub fn new_text(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self::new(InputConfig::text(label, data))
    }

    /// Create a fetch card.
    pub fn new_fetch(label: impl Into<String>, fetch_config: FetchRequestConfig) -> Self {
        Self::new(InputConfig::fetch(label, fetch_config))
    }

    /// Card variant.
    #[must_use]
    pub fn kind(&self) -> InputKind {
        self.draft().kind()
    }

    /// Current label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.draft().label
    }

    /// Current text, for text cards.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.draft().content {
            InputContent::Text { data } => Some(data),
            InputContent::Fetch { .. } => None,
        }
    }

    /// Current request, for fetch cards.
    #[must_use]
    pub fn fetch_config(&self) -> Option<&FetchRequestConfig> {
        match &self.draft().content {
            InputContent::Fetch { fetch_config } => Some(fetch_config),
            InputContent::Text { .. } => None,
        }
    }

    /// Rename the card.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.modify(|draft| draft.label = label);
    }

    /// Replace the text of a text card.
    ///
    /// # Errors
    ///
    /// [`LabError::InputKindMismatch`] on a fetch card.
    pub fn set_text(&mut self, text: impl Into<String>) -> LabResult<()> {
        let id = self.id().to_string();
        self.modify(|draft| match &mut draft.content {
            InputContent::Text { data } => {
                *data = text.into();
                Ok(())
            }
            InputContent::Fetch { .. } => Err(LabError::InputKindMismatch {
                card_id: id,
                expected: "text",
            }),
        })
    }

    /// Replace the request of a fetch card.
    ///
    /// # Errors
    ///
    /// [`LabError::InputKindMismatch`] on a text card.
    pub fn set_fetch_config(&mut self, config: FetchRequestConfig) -> LabResult<()> {
        let id = self.id().to_string();
        self.modify(|draft| match &mut draft.content {
            InputContent::Fetch { fetch_config } => {
                *fetch_config = config;
                Ok(())
            }
            InputContent::Text { .. } => Err(LabError::InputKindMismatch {
                card_id: id,
                expected: "fetch",
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::versioned::VersionPointer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_text_card_edits() {
        let mut card = InputCard::new_text("input", "hello");
        assert_eq!(card.kind(), InputKind::Text);
        card.set_text("bye").unwrap();
        card.set_label("renamed");
        assert_eq!(card.text(), Some("bye"));
        assert_eq!(card.label(), "renamed");
        assert!(card.has_unsaved_changes());
        assert_eq!(card.version(1).unwrap().content.label, "input");
    }

    #[test]
    fn test_variant_is_fixed() {
        let mut card = InputCard::new_text("input", "hello");
        let err = card
            .set_fetch_config(FetchRequestConfig::get("https://a.dev"))
            .unwrap_err();
        assert!(matches!(err, LabError::InputKindMismatch { expected: "fetch", .. }));
        assert!(!card.has_unsaved_changes());

        let mut fetch = InputCard::new_fetch("fetch 1", FetchRequestConfig::get("https://a.dev"));
        assert!(fetch.set_text("x").is_err());
        assert_eq!(fetch.text(), None);
        assert_eq!(fetch.fetch_config().unwrap().url, "https://a.dev");
    }

    #[test]
    fn test_generic_edits_cannot_switch_variant() {
        let mut card = InputCard::new_text("input", "hello");
        let err = card
            .edit(|draft| *draft = InputConfig::fetch("input", FetchRequestConfig::get("https://a.dev")))
            .unwrap_err();
        assert_eq!(err, LabError::draft_variant_changed(card.id()));
        assert_eq!(card.text(), Some("hello"));
        assert!(!card.has_unsaved_changes());

        let err = card
            .replace_draft(InputConfig::fetch("input", FetchRequestConfig::get("https://a.dev")))
            .unwrap_err();
        assert!(matches!(err, LabError::DraftVariantChanged { .. }));
        assert_eq!(card.kind(), InputKind::Text);

        card.replace_draft(InputConfig::text("renamed", "bye")).unwrap();
        card.edit(|draft| draft.label = "again".into()).unwrap();
        assert_eq!(card.text(), Some("bye"));
        assert_eq!(card.label(), "again");
    }

    #[test]
    fn test_fetch_config_edit_dirties() {
        let mut card = InputCard::new_fetch("fetch 1", FetchRequestConfig::get("https://a.dev"));
        card.set_fetch_config(FetchRequestConfig::get("https://b.dev")).unwrap();
        assert!(card.has_unsaved_changes());
        assert_eq!(card.commit(), 2);
        assert_eq!(card.current(), VersionPointer::At(2));
    }

    #[test]
    fn test_serde_layout() {
        let config = InputConfig::text("input", "hello");
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "label": "input", "type": "text", "data": "hello" })
        );
    }
}
