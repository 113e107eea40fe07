//! Generator cards: model, system message and output schema.

use crate::versioned::{Draft, VersionedEntity};
use schemalab_schema::{
    can_parse_schema, default_schema_fields, parse_schema, render_schema, SchemaField, EMPTY_SCHEMA,
};
use serde::{Deserialize, Serialize};

/// Where a generator's schema comes from. Exactly one source is authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// Edited in the field builder. An empty list means no schema.
    Fields(Vec<SchemaField>),
    /// Validated schema text, generated or imported.
    Raw(String),
}

impl Default for SchemaSource {
    fn default() -> Self {
        Self::Fields(Vec::new())
    }
}

/// Draft content of a generator card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Display label.
    pub label: String,
    /// Model id, looked up in the pricing catalog.
    pub model: String,
    /// System instruction sent with every request.
    pub system_message: String,
    /// Output schema.
    pub schema: SchemaSource,
}

impl GeneratorConfig {
    /// Create a config seeded with the default schema.
    pub fn new(
        label: impl Into<String>,
        model: impl Into<String>,
        system_message: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            model: model.into(),
            system_message: system_message.into(),
            schema: SchemaSource::Fields(default_schema_fields()),
        }
    }

    /// Use builder fields as the schema.
    #[must_use]
    pub fn with_schema_fields(mut self, fields: Vec<SchemaField>) -> Self {
        self.schema = SchemaSource::Fields(fields);
        self
    }

    /// Use schema text as the schema.
    #[must_use]
    pub fn with_raw_schema(mut self, text: impl Into<String>) -> Self {
        self.schema = SchemaSource::Raw(text.into());
        self
    }

    /// The schema text sent to the model: raw text verbatim, or the rendered
    /// field list.
    #[must_use]
    pub fn schema_text(&self) -> String {
        match &self.schema {
            SchemaSource::Raw(text) => text.clone(),
            SchemaSource::Fields(fields) if fields.is_empty() => EMPTY_SCHEMA.to_string(),
            SchemaSource::Fields(fields) => render_schema(fields),
        }
    }

    /// Builder fields, if they are the authoritative source.
    #[must_use]
    pub fn schema_fields(&self) -> Option<&[SchemaField]> {
        match &self.schema {
            SchemaSource::Fields(fields) => Some(fields),
            SchemaSource::Raw(_) => None,
        }
    }

    /// Raw schema text, if it is the authoritative source.
    #[must_use]
    pub fn raw_schema(&self) -> Option<&str> {
        match &self.schema {
            SchemaSource::Raw(text) => Some(text),
            SchemaSource::Fields(_) => None,
        }
    }

    /// Fields the builder can show for this schema. `None` when raw text
    /// cannot be represented as fields and must be edited as text.
    #[must_use]
    pub fn editable_fields(&self) -> Option<Vec<SchemaField>> {
        match &self.schema {
            SchemaSource::Fields(fields) => Some(fields.clone()),
            SchemaSource::Raw(text) if can_parse_schema(text) => Some(parse_schema(text)),
            SchemaSource::Raw(_) => None,
        }
    }

    /// Whether any schema is defined.
    #[must_use]
    pub fn has_schema(&self) -> bool {
        match &self.schema {
            SchemaSource::Raw(text) => !text.trim().is_empty(),
            SchemaSource::Fields(fields) => fields.iter().any(SchemaField::is_active),
        }
    }

    /// Set builder fields. A non-empty list replaces raw text; an empty list
    /// leaves existing raw text in place.
    pub fn set_schema_fields(&mut self, fields: Vec<SchemaField>) {
        if fields.is_empty() && matches!(self.schema, SchemaSource::Raw(_)) {
            return;
        }
        self.schema = SchemaSource::Fields(fields);
    }

    /// Set raw schema text, replacing builder fields.
    pub fn set_raw_schema(&mut self, text: impl Into<String>) {
        self.schema = SchemaSource::Raw(text.into());
    }

    /// Remove the schema entirely.
    pub fn clear_schema(&mut self) {
        self.schema = SchemaSource::Fields(Vec::new());
    }
}

impl Draft for GeneratorConfig {}

/// A versioned generator card.
pub type GeneratorCard = VersionedEntity<GeneratorConfig>;

impl VersionedEntity<GeneratorConfig> {
    /// Current label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.draft().label
    }

    /// Current model id.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.draft().model
    }

    /// Rename the card.
    pub fn set_label(&mut self, label: impl Into<String>) {
        let label = label.into();
        self.modify(|cfg| cfg.label = label);
    }

    /// Change the model.
    pub fn set_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        self.modify(|cfg| cfg.model = model);
    }

    /// Change the system message.
    pub fn set_system_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.modify(|cfg| cfg.system_message = message);
    }

    /// See [`GeneratorConfig::set_schema_fields`].
    pub fn set_schema_fields(&mut self, fields: Vec<SchemaField>) {
        self.modify(|cfg| cfg.set_schema_fields(fields));
    }

    /// See [`GeneratorConfig::set_raw_schema`].
    pub fn set_raw_schema(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.modify(|cfg| cfg.set_raw_schema(text));
    }

    /// See [`GeneratorConfig::clear_schema`].
    pub fn clear_schema(&mut self) {
        self.modify(GeneratorConfig::clear_schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> GeneratorConfig {
        GeneratorConfig::new("Default Extractor", "gpt-4.1-nano", "Extract.")
    }

    #[test]
    fn test_default_schema_rendered() {
        let text = config().schema_text();
        assert!(text.starts_with("z.object({\n  summary: z.string()"));
        assert!(config().has_schema());
    }

    #[test]
    fn test_raw_and_fields_are_exclusive() {
        let mut cfg = config();
        cfg.set_raw_schema("z.object({ a: z.number() })");
        assert_eq!(cfg.schema_fields(), None);
        assert_eq!(cfg.schema_text(), "z.object({ a: z.number() })");

        cfg.set_schema_fields(vec![SchemaField::string("b")]);
        assert_eq!(cfg.raw_schema(), None);
        assert_eq!(cfg.schema_text(), "z.object({\n  b: z.string()\n})");
    }

    #[test]
    fn test_empty_fields_keep_raw_schema() {
        let mut cfg = config().with_raw_schema("z.object({ a: z.number() })");
        cfg.set_schema_fields(vec![]);
        assert_eq!(cfg.raw_schema(), Some("z.object({ a: z.number() })"));
    }

    #[test]
    fn test_clear_schema() {
        let mut cfg = config().with_raw_schema("z.object({ a: z.number() })");
        cfg.clear_schema();
        assert_eq!(cfg.schema, SchemaSource::Fields(vec![]));
        assert_eq!(cfg.schema_text(), EMPTY_SCHEMA);
        assert!(!cfg.has_schema());
    }

    #[test]
    fn test_editable_fields() {
        let parsable = config().with_raw_schema("z.object({ a: z.number() })");
        assert_eq!(parsable.editable_fields().unwrap()[0].name, "a");

        let opaque = config().with_raw_schema("z.union([z.string(), z.number()])");
        assert!(opaque.editable_fields().is_none());
    }

    #[test]
    fn test_card_edits_track_dirty() {
        let mut card = GeneratorCard::new(config());
        card.set_system_message("Be brief.");
        assert!(card.has_unsaved_changes());
        card.set_system_message("Extract.");
        assert!(!card.has_unsaved_changes());

        card.set_model("gpt-4o");
        card.commit();
        card.set_raw_schema("z.object({})");
        assert!(card.has_unsaved_changes());
        card.revert_to_latest().unwrap();
        assert_eq!(card.model(), "gpt-4o");
        assert!(card.draft().schema_fields().is_some());
    }
}
