//! JSON Schema projection of a field tree.
//!
//! Used for structured-output APIs that take JSON Schema rather than schema
//! text. The projection is strict: every active field is required and no
//! additional properties are allowed.

use crate::field::{ArrayElement, FieldKind, SchemaField};
use crate::render::ENUM_PLACEHOLDER;
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};

/// Build a strict object schema from fields, preserving field order.
///
/// ```rust
/// use schemalab_schema::{to_json_schema, SchemaField};
///
/// let schema = to_json_schema(&[SchemaField::number("total")]);
/// assert_eq!(schema["properties"]["total"]["type"], "number");
/// assert_eq!(schema["required"][0], "total");
/// ```
#[must_use]
pub fn to_json_schema(fields: &[SchemaField]) -> JsonValue {
    let mut properties: IndexMap<String, JsonValue> = IndexMap::new();
    let mut required = Vec::new();

    for field in fields.iter().filter(|f| f.is_active()) {
        let name = field.name.trim().to_string();
        properties.insert(name.clone(), property(field));
        required.push(name);
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn property(field: &SchemaField) -> JsonValue {
    let mut schema = match &field.kind {
        FieldKind::String => json!({ "type": "string" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::Boolean => json!({ "type": "boolean" }),
        FieldKind::Enum { values } => {
            let values: Vec<&str> = if values.is_empty() {
                vec![ENUM_PLACEHOLDER]
            } else {
                values.iter().map(|v| v.trim()).collect()
            };
            json!({ "type": "string", "enum": values })
        }
        FieldKind::Array { element } => json!({ "type": "array", "items": items(element) }),
        FieldKind::Object { fields } => to_json_schema(fields),
    };

    let description = field.description.trim();
    if !description.is_empty() {
        if let Some(obj) = schema.as_object_mut() {
            obj.insert("description".to_string(), json!(description));
        }
    }
    schema
}

fn items(element: &ArrayElement) -> JsonValue {
    match element {
        ArrayElement::String => json!({ "type": "string" }),
        ArrayElement::Number => json!({ "type": "number" }),
        ArrayElement::Boolean => json!({ "type": "boolean" }),
        ArrayElement::Object { fields } => to_json_schema(fields),
    }
}
