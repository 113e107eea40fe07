//! The schema field tree.
//!
//! A [`SchemaField`] is a named node whose [`FieldKind`] carries exactly the
//! payload of its type: enum values live only on enums, nested fields only on
//! objects and arrays of objects. Changing the type replaces the kind, so a
//! stale payload from a previous type cannot survive.

use schemalab_core::FieldId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single field of an extraction schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Opaque identifier, unique within a tree.
    #[serde(default)]
    pub id: FieldId,
    /// Property name. Blank names mark a placeholder that is never rendered.
    pub name: String,
    /// Free-text description, rendered as `.describe(...)` when non-blank.
    #[serde(default)]
    pub description: String,
    /// Type tag and its payload.
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Field type together with its type-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    /// `z.string()`
    String,
    /// `z.number()`
    Number,
    /// `z.boolean()`
    Boolean,
    /// `z.enum([...])`
    Enum {
        /// Allowed literal values, in order.
        #[serde(default)]
        values: Vec<String>,
    },
    /// `z.array(...)`
    Array {
        /// Element type.
        element: ArrayElement,
    },
    /// `z.object({...})`
    Object {
        /// Nested fields, in order.
        #[serde(default)]
        fields: Vec<SchemaField>,
    },
}

/// Element type of an array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ArrayElement {
    /// Array of strings.
    String,
    /// Array of numbers.
    Number,
    /// Array of booleans.
    Boolean,
    /// Array of objects with the given fields.
    Object {
        /// Fields of each element.
        #[serde(default)]
        fields: Vec<SchemaField>,
    },
}

/// Payload-free field type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// String.
    String,
    /// Number.
    Number,
    /// Boolean.
    Boolean,
    /// Array.
    Array,
    /// Enum.
    Enum,
    /// Object.
    Object,
}

/// Payload-free array element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayElementType {
    /// String elements.
    String,
    /// Number elements.
    Number,
    /// Boolean elements.
    Boolean,
    /// Object elements.
    Object,
}

impl FieldType {
    /// All field types, in builder order.
    pub const ALL: [FieldType; 6] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Enum,
        FieldType::Object,
    ];

    /// The constructor name used in schema text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Enum => "enum",
            Self::Object => "object",
        }
    }

    /// A fresh kind of this type with an empty payload.
    #[must_use]
    pub fn default_kind(self) -> FieldKind {
        match self {
            Self::String => FieldKind::String,
            Self::Number => FieldKind::Number,
            Self::Boolean => FieldKind::Boolean,
            Self::Array => FieldKind::Array {
                element: ArrayElement::String,
            },
            Self::Enum => FieldKind::Enum { values: Vec::new() },
            Self::Object => FieldKind::Object { fields: Vec::new() },
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown field type: {s}"))
    }
}

impl ArrayElementType {
    /// The constructor name used in schema text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// A fresh element of this type.
    #[must_use]
    pub fn default_element(self) -> ArrayElement {
        match self {
            Self::String => ArrayElement::String,
            Self::Number => ArrayElement::Number,
            Self::Boolean => ArrayElement::Boolean,
            Self::Object => ArrayElement::Object { fields: Vec::new() },
        }
    }
}

impl fmt::Display for ArrayElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FieldKind {
    /// The payload-free tag.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::String => FieldType::String,
            Self::Number => FieldType::Number,
            Self::Boolean => FieldType::Boolean,
            Self::Array { .. } => FieldType::Array,
            Self::Enum { .. } => FieldType::Enum,
            Self::Object { .. } => FieldType::Object,
        }
    }
}

impl ArrayElement {
    /// The payload-free tag.
    #[must_use]
    pub fn element_type(&self) -> ArrayElementType {
        match self {
            Self::String => ArrayElementType::String,
            Self::Number => ArrayElementType::Number,
            Self::Boolean => ArrayElementType::Boolean,
            Self::Object { .. } => ArrayElementType::Object,
        }
    }
}

/// A single edit applied to a field by the builder.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    /// Rename.
    Name(String),
    /// Replace the description.
    Description(String),
    /// Change the type, discarding the previous payload.
    Type(FieldType),
    /// Replace enum values. Ignored unless the field is an enum.
    EnumValues(Vec<String>),
    /// Change the element type. Ignored unless the field is an array.
    ArrayElementType(ArrayElementType),
}

impl SchemaField {
    /// Create a field with a fresh id.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: FieldId::new(),
            name: name.into(),
            description: String::new(),
            kind,
        }
    }

    /// A string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    /// A number field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// A boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    /// An enum field.
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            FieldKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// An array field.
    pub fn array(name: impl Into<String>, element: ArrayElement) -> Self {
        Self::new(name, FieldKind::Array { element })
    }

    /// An array-of-objects field.
    pub fn object_array(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self::array(name, ArrayElement::Object { fields })
    }

    /// A nested object field.
    pub fn object(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self::new(name, FieldKind::Object { fields })
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replace the id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<FieldId>) -> Self {
        self.id = id.into();
        self
    }

    /// The payload-free type tag.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Whether this field takes part in rendering (non-blank name).
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// Change the type. A no-op when the type is unchanged, otherwise the
    /// payload is reset to the empty payload of the new type.
    pub fn set_type(&mut self, field_type: FieldType) {
        if self.field_type() != field_type {
            self.kind = field_type.default_kind();
        }
    }

    /// Change the element type of an array field. Returns `false` when the
    /// field is not an array.
    pub fn set_array_element_type(&mut self, element_type: ArrayElementType) -> bool {
        match &mut self.kind {
            FieldKind::Array { element } => {
                if element.element_type() != element_type {
                    *element = element_type.default_element();
                }
                true
            }
            _ => false,
        }
    }

    /// Apply a builder edit. Payload edits that don't fit the current type are
    /// ignored and reported as `false`.
    pub fn apply(&mut self, update: FieldUpdate) -> bool {
        match update {
            FieldUpdate::Name(name) => self.name = name,
            FieldUpdate::Description(description) => self.description = description,
            FieldUpdate::Type(field_type) => self.set_type(field_type),
            FieldUpdate::EnumValues(new_values) => match &mut self.kind {
                FieldKind::Enum { values } => *values = new_values,
                _ => return false,
            },
            FieldUpdate::ArrayElementType(element_type) => {
                return self.set_array_element_type(element_type)
            }
        }
        true
    }

    /// Nested fields of an object or array-of-objects field.
    #[must_use]
    pub fn children(&self) -> Option<&[SchemaField]> {
        match &self.kind {
            FieldKind::Object { fields }
            | FieldKind::Array {
                element: ArrayElement::Object { fields },
            } => Some(fields),
            _ => None,
        }
    }

    /// Mutable nested fields of an object or array-of-objects field.
    pub fn children_mut(&mut self) -> Option<&mut Vec<SchemaField>> {
        match &mut self.kind {
            FieldKind::Object { fields }
            | FieldKind::Array {
                element: ArrayElement::Object { fields },
            } => Some(fields),
            _ => None,
        }
    }

    /// Structural equality: name, description and kind, ignoring ids.
    #[must_use]
    pub fn same_shape(&self, other: &SchemaField) -> bool {
        if self.name != other.name || self.description != other.description {
            return false;
        }
        match (&self.kind, &other.kind) {
            (FieldKind::Enum { values: a }, FieldKind::Enum { values: b }) => a == b,
            (FieldKind::Array { element: a }, FieldKind::Array { element: b }) => {
                match (a, b) {
                    (ArrayElement::Object { fields: a }, ArrayElement::Object { fields: b }) => {
                        same_shape(a, b)
                    }
                    _ => a == b,
                }
            }
            (FieldKind::Object { fields: a }, FieldKind::Object { fields: b }) => same_shape(a, b),
            (a, b) => a == b,
        }
    }
}

/// Structural equality of two field lists, ignoring ids.
#[must_use]
pub fn same_shape(a: &[SchemaField], b: &[SchemaField]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
}

/// Find a field anywhere in the tree.
#[must_use]
pub fn find_field<'a>(fields: &'a [SchemaField], id: &FieldId) -> Option<&'a SchemaField> {
    for field in fields {
        if &field.id == id {
            return Some(field);
        }
        if let Some(found) = field.children().and_then(|c| find_field(c, id)) {
            return Some(found);
        }
    }
    None
}

/// Find a field anywhere in the tree, mutably.
pub fn find_field_mut<'a>(
    fields: &'a mut [SchemaField],
    id: &FieldId,
) -> Option<&'a mut SchemaField> {
    for field in fields.iter_mut() {
        if &field.id == id {
            return Some(field);
        }
        if let Some(found) = field.children_mut().and_then(|c| find_field_mut(c, id)) {
            return Some(found);
        }
    }
    None
}

/// Apply an edit to the field with the given id. Returns `false` when the
/// field was not found or the edit did not fit its type.
pub fn update_field(fields: &mut [SchemaField], id: &FieldId, update: FieldUpdate) -> bool {
    find_field_mut(fields, id).is_some_and(|field| field.apply(update))
}

/// Remove the field with the given id from anywhere in the tree.
pub fn remove_field(fields: &mut Vec<SchemaField>, id: &FieldId) -> Option<SchemaField> {
    if let Some(pos) = fields.iter().position(|f| &f.id == id) {
        return Some(fields.remove(pos));
    }
    fields
        .iter_mut()
        .filter_map(SchemaField::children_mut)
        .find_map(|children| remove_field(children, id))
}

/// Append a field to the children of `parent_id`. Returns `false` when the
/// parent does not exist or cannot hold fields.
pub fn add_nested_field(fields: &mut [SchemaField], parent_id: &FieldId, field: SchemaField) -> bool {
    match find_field_mut(fields, parent_id).and_then(SchemaField::children_mut) {
        Some(children) => {
            children.push(field);
            true
        }
        None => false,
    }
}

/// The schema every new generator starts with.
#[must_use]
pub fn default_schema_fields() -> Vec<SchemaField> {
    vec![
        SchemaField::string("summary").with_description("A brief summary of the text."),
        SchemaField::object_array(
            "actionItems",
            vec![
                SchemaField::string("task").with_description("The action to be taken."),
                SchemaField::string("assignee").with_description("Who is responsible for the task."),
            ],
        )
        .with_description("A list of action items from the text."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_type_discards_payload() {
        let mut field = SchemaField::enumeration("status", ["open", "closed"]);
        field.set_type(FieldType::String);
        assert_eq!(field.kind, FieldKind::String);

        let json = serde_json::to_value(&field).unwrap();
        assert!(json.get("values").is_none());
        assert_eq!(json["type"], "string");
    }

    #[test]
    fn test_set_same_type_keeps_payload() {
        let mut field = SchemaField::enumeration("status", ["open"]);
        field.set_type(FieldType::Enum);
        assert_eq!(
            field.kind,
            FieldKind::Enum {
                values: vec!["open".into()]
            }
        );
    }

    #[test]
    fn test_type_changes_only_carry_current_payload() {
        let mut field = SchemaField::object("meta", vec![SchemaField::string("a")]);
        let sequence = [
            FieldType::Array,
            FieldType::Enum,
            FieldType::Object,
            FieldType::Boolean,
            FieldType::Array,
        ];
        for t in sequence {
            field.apply(FieldUpdate::Type(t));
            assert_eq!(field.field_type(), t);
            assert_eq!(field.kind, t.default_kind());
        }
    }

    #[test]
    fn test_payload_update_on_wrong_type_is_ignored() {
        let mut field = SchemaField::string("name");
        assert!(!field.apply(FieldUpdate::EnumValues(vec!["x".into()])));
        assert!(!field.apply(FieldUpdate::ArrayElementType(ArrayElementType::Number)));
        assert_eq!(field.kind, FieldKind::String);
    }

    #[test]
    fn test_array_element_switch() {
        let mut field = SchemaField::object_array("items", vec![SchemaField::string("a")]);
        assert!(field.set_array_element_type(ArrayElementType::Number));
        assert_eq!(
            field.kind,
            FieldKind::Array {
                element: ArrayElement::Number
            }
        );
        assert!(field.set_array_element_type(ArrayElementType::Object));
        assert_eq!(field.children(), Some(&[][..]));
    }

    #[test]
    fn test_tree_helpers() {
        let mut fields = default_schema_fields();
        let parent = fields[1].id.clone();
        let child = SchemaField::number("priority");
        let child_id = child.id.clone();

        assert!(add_nested_field(&mut fields, &parent, child));
        assert!(update_field(
            &mut fields,
            &child_id,
            FieldUpdate::Description("How urgent".into())
        ));
        assert_eq!(find_field(&fields, &child_id).unwrap().description, "How urgent");

        let removed = remove_field(&mut fields, &child_id).unwrap();
        assert_eq!(removed.name, "priority");
        assert!(find_field(&fields, &child_id).is_none());

        let leaf = fields[0].id.clone();
        assert!(!add_nested_field(&mut fields, &leaf, SchemaField::string("x")));
    }

    #[test]
    fn test_default_schema_fields() {
        let fields = default_schema_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "summary");
        assert_eq!(fields[1].name, "actionItems");
        let children = fields[1].children().unwrap();
        assert_eq!(children[0].name, "task");
        assert_eq!(children[1].name, "assignee");
    }

    #[test]
    fn test_same_shape_ignores_ids() {
        let a = default_schema_fields();
        let b = default_schema_fields();
        assert_ne!(a, b);
        assert!(same_shape(&a, &b));
    }

    #[test]
    fn test_serde_layout() {
        let field = SchemaField::object_array("items", vec![SchemaField::string("a")])
            .with_id("field_1");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["id"], "field_1");
        assert_eq!(json["type"], "array");
        assert_eq!(json["element"]["type"], "object");
        assert_eq!(json["element"]["fields"][0]["name"], "a");

        let back: SchemaField = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_field_type_from_str() {
        assert_eq!("enum".parse::<FieldType>().unwrap(), FieldType::Enum);
        assert!("union".parse::<FieldType>().is_err());
    }
}
