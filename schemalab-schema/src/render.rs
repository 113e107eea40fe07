//! Field tree → schema text.

use crate::field::{ArrayElement, FieldKind, SchemaField};

/// Schema text for a schema with no fields.
pub const EMPTY_SCHEMA: &str = "z.object({})";

/// Stand-in literal rendered for an enum without values.
pub const ENUM_PLACEHOLDER: &str = "PLACEHOLDER";

const INDENT: &str = "  ";

/// Render fields as canonical schema text.
///
/// Fields with a blank name are skipped. Each nesting level indents by two
/// spaces. A list with no renderable fields yields [`EMPTY_SCHEMA`].
///
/// ```rust
/// use schemalab_schema::{render_schema, SchemaField};
///
/// let text = render_schema(&[
///     SchemaField::enumeration("mood", ["happy", "sad"]),
///     SchemaField::string(""),
/// ]);
/// assert_eq!(text, "z.object({\n  mood: z.enum([\"happy\", \"sad\"])\n})");
/// ```
#[must_use]
pub fn render_schema(fields: &[SchemaField]) -> String {
    if !fields.iter().any(SchemaField::is_active) {
        return EMPTY_SCHEMA.to_string();
    }
    render_object(fields, 1)
}

fn render_object(fields: &[SchemaField], level: usize) -> String {
    let indent = INDENT.repeat(level);
    let closing = INDENT.repeat(level.saturating_sub(1));
    let body = fields
        .iter()
        .filter(|f| f.is_active())
        .map(|f| format!("{indent}{}: {}", f.name.trim(), render_type(f, level)))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("z.object({{\n{body}\n{closing}}})")
}

fn render_type(field: &SchemaField, level: usize) -> String {
    let mut expr = match &field.kind {
        FieldKind::String => "z.string()".to_string(),
        FieldKind::Number => "z.number()".to_string(),
        FieldKind::Boolean => "z.boolean()".to_string(),
        FieldKind::Enum { values } if values.is_empty() => {
            format!("z.enum([\"{ENUM_PLACEHOLDER}\"])")
        }
        FieldKind::Enum { values } => {
            let literals = values
                .iter()
                .map(|v| quote(v.trim()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("z.enum([{literals}])")
        }
        FieldKind::Array {
            element: ArrayElement::Object { fields },
        } => format!("z.array({})", render_object(fields, level + 1)),
        FieldKind::Array { element } => format!("z.array(z.{}())", element.element_type()),
        FieldKind::Object { fields } => render_object(fields, level + 1),
    };

    let description = field.description.trim();
    if !description.is_empty() {
        expr.push_str(&format!(".describe({})", quote(description)));
    }
    expr
}

/// Double-quoted literal with backslashes and quotes escaped.
fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::default_schema_fields;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_summary_scenario() {
        let fields = vec![SchemaField::string("summary").with_description("desc")];
        assert_eq!(
            render_schema(&fields),
            "z.object({\n  summary: z.string().describe(\"desc\")\n})"
        );
    }

    #[test]
    fn test_default_fields() {
        let expected = "z.object({\n  \
summary: z.string().describe(\"A brief summary of the text.\"),\n  \
actionItems: z.array(z.object({\n    \
task: z.string().describe(\"The action to be taken.\"),\n    \
assignee: z.string().describe(\"Who is responsible for the task.\")\n  \
})).describe(\"A list of action items from the text.\")\n})";
        assert_eq!(render_schema(&default_schema_fields()), expected);
    }

    #[test]
    fn test_empty_and_inactive() {
        assert_eq!(render_schema(&[]), EMPTY_SCHEMA);
        assert_eq!(render_schema(&[SchemaField::string("   ")]), EMPTY_SCHEMA);
    }

    #[test]
    fn test_empty_enum_placeholder() {
        let fields = vec![SchemaField::enumeration("e", Vec::<String>::new())];
        assert_eq!(render_schema(&fields), "z.object({\n  e: z.enum([\"PLACEHOLDER\"])\n})");
    }

    #[test]
    fn test_nested_object_and_primitive_array() {
        let fields = vec![
            SchemaField::object("meta", vec![SchemaField::number("year"), SchemaField::string("")]),
            SchemaField::array("flags", ArrayElement::Boolean),
            SchemaField::object("empty", vec![]),
        ];
        assert_eq!(
            render_schema(&fields),
            "z.object({\n  meta: z.object({\n    year: z.number()\n  }),\n  flags: z.array(z.boolean()),\n  empty: z.object({\n\n  })\n})"
        );
    }

    #[test]
    fn test_escaping_and_trimming() {
        let fields = vec![
            SchemaField::enumeration(" kind ", [" a\"b ", "c\\d"]).with_description("  say \"hi\"  "),
        ];
        assert_eq!(
            render_schema(&fields),
            "z.object({\n  kind: z.enum([\"a\\\"b\", \"c\\\\d\"]).describe(\"say \\\"hi\\\"\")\n})"
        );
    }

    #[test]
    fn test_blank_description_omitted() {
        let fields = vec![SchemaField::boolean("ok").with_description("   ")];
        assert_eq!(render_schema(&fields), "z.object({\n  ok: z.boolean()\n})");
    }

    #[test]
    fn test_deterministic() {
        let fields = default_schema_fields();
        assert_eq!(render_schema(&fields), render_schema(&fields));
    }
}
