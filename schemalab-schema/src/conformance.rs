//! Checking generated values against a field tree.
//!
//! Mirrors what the schema engine on the model side enforces for the
//! supported subset: every active field is required, types must match and enum
//! values must be listed. Unknown keys are allowed.

use crate::field::{ArrayElement, FieldKind, SchemaField};
use crate::render::ENUM_PLACEHOLDER;
use schemalab_core::SchemaIssue;
use serde_json::{Map, Value as JsonValue};

/// Check a value against fields, returning every violation found.
/// An empty result means the value conforms.
///
/// ```rust
/// use schemalab_schema::{check_value, SchemaField};
/// use serde_json::json;
///
/// let fields = vec![SchemaField::string("summary")];
/// assert!(check_value(&fields, &json!({ "summary": "ok" })).is_empty());
///
/// let issues = check_value(&fields, &json!({ "summary": 1 }));
/// assert_eq!(issues[0].path, "summary");
/// assert_eq!(issues[0].message, "Expected string, received number");
/// ```
#[must_use]
pub fn check_value(fields: &[SchemaField], value: &JsonValue) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();
    check_object(fields, value, "", &mut issues);
    issues
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn join(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{path}.{segment}")
    }
}

fn mismatch(path: &str, expected: &str, value: &JsonValue, issues: &mut Vec<SchemaIssue>) {
    issues.push(SchemaIssue::new(
        path,
        format!("Expected {expected}, received {}", json_type(value)),
    ));
}

fn check_object(fields: &[SchemaField], value: &JsonValue, path: &str, issues: &mut Vec<SchemaIssue>) {
    let Some(map) = value.as_object() else {
        mismatch(path, "object", value, issues);
        return;
    };
    check_fields(fields, map, path, issues);
}

fn check_fields(
    fields: &[SchemaField],
    map: &Map<String, JsonValue>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    for field in fields.iter().filter(|f| f.is_active()) {
        let name = field.name.trim();
        let field_path = join(path, name);
        match map.get(name) {
            None => issues.push(SchemaIssue::new(field_path, "Required")),
            Some(v) => check_kind(&field.kind, v, &field_path, issues),
        }
    }
}

fn check_kind(kind: &FieldKind, value: &JsonValue, path: &str, issues: &mut Vec<SchemaIssue>) {
    match kind {
        FieldKind::String if !value.is_string() => mismatch(path, "string", value, issues),
        FieldKind::Number if !value.is_number() => mismatch(path, "number", value, issues),
        FieldKind::Boolean if !value.is_boolean() => mismatch(path, "boolean", value, issues),
        FieldKind::Enum { values } => check_enum(values, value, path, issues),
        FieldKind::Array { element } => match value.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_element(element, item, &join(path, &i.to_string()), issues);
                }
            }
            None => mismatch(path, "array", value, issues),
        },
        FieldKind::Object { fields } => check_object(fields, value, path, issues),
        _ => {}
    }
}

fn check_element(element: &ArrayElement, value: &JsonValue, path: &str, issues: &mut Vec<SchemaIssue>) {
    match element {
        ArrayElement::String => check_kind(&FieldKind::String, value, path, issues),
        ArrayElement::Number => check_kind(&FieldKind::Number, value, path, issues),
        ArrayElement::Boolean => check_kind(&FieldKind::Boolean, value, path, issues),
        ArrayElement::Object { fields } => check_object(fields, value, path, issues),
    }
}

fn check_enum(values: &[String], value: &JsonValue, path: &str, issues: &mut Vec<SchemaIssue>) {
    let allowed: Vec<&str> = if values.is_empty() {
        vec![ENUM_PLACEHOLDER]
    } else {
        values.iter().map(|v| v.trim()).collect()
    };
    match value.as_str() {
        Some(s) if allowed.contains(&s) => {}
        Some(s) => {
            let expected = allowed
                .iter()
                .map(|v| format!("'{v}'"))
                .collect::<Vec<_>>()
                .join(" | ");
            issues.push(SchemaIssue::new(
                path,
                format!("Invalid enum value. Expected {expected}, received '{s}'"),
            ));
        }
        None => mismatch(path, "string", value, issues),
    }
}
