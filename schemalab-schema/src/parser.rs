//! Best-effort schema text parser.
//!
//! Recovers a field list from schema text written in the subset that
//! [`render_schema`](crate::render_schema) produces:
//!
//! ```text
//! object  := "z" "." "object" "(" "{" clause ("," clause)* ","? "}" ")"
//! clause  := WORD ":" expr
//! expr    := call ("." "describe" "(" STRING ")")?
//! call    := "z" "." WORD "(" args ")"
//! ```
//!
//! Parsing is total. Text without an object literal yields no fields, clauses
//! that aren't `name: expr` are dropped, and any expression outside the six
//! supported constructors degrades to a string field. A union, a literal or a
//! chained `.optional()` therefore comes back as `string`.
//!
//! [`parse_schema_exact`] walks the same grammar but refuses instead of
//! degrading, so its result is only present when it means what the text says.

use crate::field::{ArrayElement, FieldKind, SchemaField};
use crate::lexer::{matching_close, split_top_level, tokenize, Token};

/// How unrecognized constructs are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Degrade to `string` and drop malformed clauses.
    Lenient,
    /// Give up on the first construct the field model can't represent.
    Exact,
}

/// Parse schema text into fields. Returns an empty list when nothing usable
/// is found.
#[must_use]
pub fn parse_schema(text: &str) -> Vec<SchemaField> {
    let tokens = tokenize(text);
    let Some(start) = find_object_call(&tokens) else {
        tracing::debug!(target: "schemalab::schema", "no z.object({{...}}) found in schema text");
        return Vec::new();
    };
    match object_fields(&tokens[start..], Mode::Lenient) {
        Some(fields) => fields,
        None => {
            tracing::debug!(target: "schemalab::schema", "unbalanced object literal in schema text");
            Vec::new()
        }
    }
}

/// Parse schema text only if the field model represents it without loss.
///
/// The whole text has to be a single `z.object({...})` call (an optional
/// trailing `;` is allowed) built from the six supported constructors, each
/// with at most one trailing `.describe(...)`. Anything else, such as a
/// union, a literal, `.optional()` or a bound, yields `None`. Use this where
/// a lossy reading would change meaning, e.g. when deriving a JSON Schema or
/// checking a generated value.
#[must_use]
pub fn parse_schema_exact(text: &str) -> Option<Vec<SchemaField>> {
    let mut tokens = tokenize(text);
    if tokens.last() == Some(&Token::Other(';')) {
        tokens.pop();
    }
    if find_object_call(&tokens) != Some(0) {
        return None;
    }
    let fields = object_fields(&tokens, Mode::Exact);
    if fields.is_none() {
        tracing::debug!(target: "schemalab::schema", "schema text not representable as fields");
    }
    fields
}

/// Whether the text parses to at least one field, i.e. whether the field
/// builder can represent it.
#[must_use]
pub fn can_parse_schema(text: &str) -> bool {
    !parse_schema(text).is_empty()
}

/// Position of the first `z.object({`.
fn find_object_call(tokens: &[Token]) -> Option<usize> {
    tokens.windows(5).position(|w| {
        w[0].is_word("z")
            && w[1] == Token::Dot
            && w[2].is_word("object")
            && w[3] == Token::LParen
            && w[4] == Token::LBrace
    })
}

/// Fields of a `z.object({...})` call starting at the first token.
fn object_fields(tokens: &[Token], mode: Mode) -> Option<Vec<SchemaField>> {
    let (name, args) = constructor_call(tokens)?;
    if name != "object" {
        return None;
    }
    literal_fields(args, mode)
}

/// Fields of a `{ ... }` literal spanning the whole slice.
fn literal_fields(tokens: &[Token], mode: Mode) -> Option<Vec<SchemaField>> {
    if tokens.first() != Some(&Token::LBrace) || matching_close(tokens, 0)? != tokens.len() - 1 {
        return None;
    }
    let body = &tokens[1..tokens.len() - 1];
    let clauses = split_top_level(body, &Token::Comma)
        .into_iter()
        .filter(|clause| !clause.is_empty());
    match mode {
        Mode::Lenient => Some(clauses.filter_map(|c| parse_clause(c, mode)).collect()),
        Mode::Exact => clauses.map(|c| parse_clause(c, mode)).collect(),
    }
}

/// Split `z . name ( args )` into the constructor name and its argument
/// tokens. The call has to span the whole slice.
fn constructor_call(tokens: &[Token]) -> Option<(&str, &[Token])> {
    match tokens {
        [Token::Word(z), Token::Dot, Token::Word(name), Token::LParen, ..] if z == "z" => {
            let close = matching_close(tokens, 3)?;
            (close == tokens.len() - 1).then(|| (name.as_str(), &tokens[4..close]))
        }
        _ => None,
    }
}

fn parse_clause(clause: &[Token], mode: Mode) -> Option<SchemaField> {
    let [Token::Word(name), Token::Colon, expr @ ..] = clause else {
        return None;
    };
    if expr.is_empty() {
        return None;
    }
    let (core, description) = strip_describe(expr);
    let kind = classify(&core, mode)?;
    Some(SchemaField::new(name.clone(), kind).with_description(description.unwrap_or_default()))
}

/// Remove the first top-level `.describe("...")` suffix, returning the
/// remaining tokens and the description.
fn strip_describe(expr: &[Token]) -> (Vec<Token>, Option<String>) {
    let mut depth = 0usize;
    for (i, token) in expr.iter().enumerate() {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && *token == Token::Dot {
            if let [Token::Dot, Token::Word(method), Token::LParen, Token::Str(text), Token::RParen, ..] =
                &expr[i..]
            {
                if method == "describe" {
                    let mut core = expr[..i].to_vec();
                    core.extend_from_slice(&expr[i + 5..]);
                    return (core, Some(text.clone()));
                }
            }
        }
    }
    (expr.to_vec(), None)
}

/// Kind of a constructor expression. Lenient mode never returns `None`.
fn classify(expr: &[Token], mode: Mode) -> Option<FieldKind> {
    let fallback = || match mode {
        Mode::Lenient => Some(FieldKind::String),
        Mode::Exact => None,
    };
    let Some((name, args)) = constructor_call(expr) else {
        return fallback();
    };
    match name {
        "string" | "number" | "boolean" if !args.is_empty() => fallback(),
        "string" => Some(FieldKind::String),
        "number" => Some(FieldKind::Number),
        "boolean" => Some(FieldKind::Boolean),
        "enum" => match enum_values(args, mode) {
            Some(values) => Some(FieldKind::Enum { values }),
            None => fallback(),
        },
        "array" => match array_element(args, mode) {
            Some(element) => Some(FieldKind::Array { element }),
            None => fallback(),
        },
        "object" => match literal_fields(args, mode) {
            Some(fields) => Some(FieldKind::Object { fields }),
            None => fallback(),
        },
        _ => fallback(),
    }
}

/// Literal values of `[ "a", "b" ]`. A malformed list yields no values in
/// lenient mode and `None` in exact mode.
fn enum_values(args: &[Token], mode: Mode) -> Option<Vec<String>> {
    let [Token::LBracket, items @ .., Token::RBracket] = args else {
        return (mode == Mode::Lenient).then(Vec::new);
    };
    let items = split_top_level(items, &Token::Comma)
        .into_iter()
        .filter(|item| !item.is_empty());
    match mode {
        Mode::Lenient => Some(
            items
                .filter_map(|item| match item {
                    [Token::Str(value)] | [Token::Word(value)] => Some(value.clone()),
                    _ => None,
                })
                .collect(),
        ),
        Mode::Exact => {
            let values: Option<Vec<String>> = items
                .map(|item| match item {
                    [Token::Str(value)] => Some(value.clone()),
                    _ => None,
                })
                .collect();
            values.filter(|v| !v.is_empty())
        }
    }
}

fn array_element(args: &[Token], mode: Mode) -> Option<ArrayElement> {
    let (name, inner) = constructor_call(args)?;
    match name {
        "string" if inner.is_empty() => Some(ArrayElement::String),
        "number" if inner.is_empty() => Some(ArrayElement::Number),
        "boolean" if inner.is_empty() => Some(ArrayElement::Boolean),
        "object" => literal_fields(inner, mode).map(|fields| ArrayElement::Object { fields }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{same_shape, FieldType};
    use crate::render::render_schema;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_round_trip_summary() {
        let text = "z.object({\n  summary: z.string().describe(\"desc\")\n})";
        let fields = parse_schema(text);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "summary");
        assert_eq!(fields[0].field_type(), FieldType::String);
        assert_eq!(fields[0].description, "desc");
    }

    #[rstest]
    #[case("")]
    #[case("not a schema")]
    #[case("z.object(")]
    #[case("z.object({")]
    #[case("z.object({ a: z.string() ")]
    #[case("}}}))) z.object({ a: ((( })")]
    #[case("z.string()")]
    #[case("\"z.object({ a: z.string() })\"")]
    fn test_parse_is_total(#[case] text: &str) {
        let _ = parse_schema(text);
    }

    #[rstest]
    #[case("")]
    #[case("hello")]
    #[case("z.object(")]
    #[case("z.object({})")]
    fn test_unusable_text_yields_no_fields(#[case] text: &str) {
        assert!(parse_schema(text).is_empty());
        assert!(!can_parse_schema(text));
    }

    #[test]
    fn test_all_supported_shapes() {
        let text = r#"z.object({
            title: z.string(),
            count: z.number().describe("How many"),
            done: z.boolean(),
            status: z.enum(["open", "closed"]),
            tags: z.array(z.string()),
            scores: z.array(z.number()),
            items: z.array(z.object({ task: z.string() })),
            meta: z.object({ author: z.string(), year: z.number() }),
        })"#;
        let fields = parse_schema(text);
        let types: Vec<_> = fields.iter().map(SchemaField::field_type).collect();
        assert_eq!(
            types,
            vec![
                FieldType::String,
                FieldType::Number,
                FieldType::Boolean,
                FieldType::Enum,
                FieldType::Array,
                FieldType::Array,
                FieldType::Array,
                FieldType::Object,
            ]
        );
        assert_eq!(fields[1].description, "How many");
        assert_eq!(
            fields[3].kind,
            FieldKind::Enum {
                values: vec!["open".into(), "closed".into()]
            }
        );
        assert_eq!(fields[6].children().unwrap()[0].name, "task");
        assert_eq!(fields[7].children().unwrap().len(), 2);
    }

    #[rstest]
    #[case("z.union([z.string(), z.number()])")]
    #[case("z.literal(\"x\")")]
    #[case("z.number().optional()")]
    #[case("z.array(z.union([z.string()]))")]
    #[case("z.array()")]
    #[case("z.object(42)")]
    #[case("whatever")]
    fn test_unrecognized_falls_back_to_string(#[case] expr: &str) {
        let fields = parse_schema(&format!("z.object({{ a: {expr}.describe(\"kept\") }})"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].kind, FieldKind::String);
        assert_eq!(fields[0].description, "kept");
    }

    #[test]
    fn test_malformed_enum_list_is_empty_enum() {
        let fields = parse_schema("z.object({ a: z.enum(VALUES) })");
        assert_eq!(fields[0].kind, FieldKind::Enum { values: vec![] });
    }

    #[test]
    fn test_invalid_clauses_dropped() {
        let fields = parse_schema("z.object({ a: z.string(), 'quoted': z.string(), : z.number(), b })");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "a");
    }

    #[test]
    fn test_commas_and_brackets_inside_strings() {
        let fields = parse_schema(
            r#"z.object({ a: z.string().describe("x, y (z) {w}"), b: z.enum(["1,2", 'it\'s']) })"#,
        );
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].description, "x, y (z) {w}");
        assert_eq!(
            fields[1].kind,
            FieldKind::Enum {
                values: vec!["1,2".into(), "it's".into()]
            }
        );
    }

    #[test]
    fn test_describe_before_other_chain() {
        let fields = parse_schema("z.object({ a: z.string().describe(`tick`) })");
        assert_eq!(fields[0].description, "tick");
        assert_eq!(fields[0].kind, FieldKind::String);
    }

    #[test]
    fn test_locates_object_after_prefix() {
        let fields = parse_schema("const schema = z.object({ a: z.number() });");
        assert_eq!(fields[0].kind, FieldKind::Number);
    }

    #[rstest]
    #[case("z.object({ a: z.number().optional() })")]
    #[case("z.object({ a: z.union([z.string(), z.number()]) })")]
    #[case("z.object({ a: z.literal(\"x\") })")]
    #[case("z.object({ a: z.string().nullable().describe(\"d\") })")]
    #[case("z.object({ a: z.string().max(5) })")]
    #[case("z.object({ a: z.array(z.string()).min(1) })")]
    #[case("z.object({ a: z.enum(VALUES) })")]
    #[case("z.object({ a: z.string(), 'b': z.string() })")]
    #[case("z.object({ a: z.object({ b: z.number().optional() }) })")]
    #[case("z.object({ a: z.string() }).strict()")]
    #[case("const schema = z.object({ a: z.string() })")]
    #[case("not a schema")]
    fn test_exact_parse_refuses_lossy_text(#[case] text: &str) {
        assert!(parse_schema_exact(text).is_none());
    }

    #[rstest]
    #[case("z.object({ a: z.string() })", 1)]
    #[case("z.object({ a: z.string(), })", 1)]
    #[case("z.object({ a: z.number() });", 1)]
    #[case("z.object({})", 0)]
    #[case("z.object({ a: z.enum([\"x\", 'y']).describe(\"pick\"), b: z.array(z.object({ c: z.boolean() })) })", 2)]
    fn test_exact_parse_accepts_representable_text(#[case] text: &str, #[case] count: usize) {
        let fields = parse_schema_exact(text).unwrap();
        assert_eq!(fields.len(), count);
        assert!(same_shape(&fields, &parse_schema(text)));
    }

    #[test]
    fn test_exact_parse_of_rendered_text() {
        let fields = vec![
            SchemaField::string("summary").with_description("desc"),
            SchemaField::enumeration("mood", ["happy", "sad"]),
            SchemaField::object_array("rows", vec![SchemaField::number("n")]),
        ];
        let text = render_schema(&fields);
        let exact = parse_schema_exact(&text).unwrap();
        assert!(same_shape(&exact, &fields));
    }

    #[test]
    fn test_render_parse_render_is_stable() {
        let fields = vec![
            SchemaField::string("summary").with_description("A \"quoted\" summary"),
            SchemaField::enumeration("mood", ["happy", "sad"]),
            SchemaField::enumeration("empty", Vec::<String>::new()),
            SchemaField::array("tags", ArrayElement::Boolean).with_description("flags"),
            SchemaField::object_array("rows", vec![]),
            SchemaField::object(
                "meta",
                vec![
                    SchemaField::number("year"),
                    SchemaField::object("deep", vec![SchemaField::string("x")]),
                ],
            ),
        ];
        let first = render_schema(&fields);
        let parsed = parse_schema(&first);
        let second = render_schema(&parsed);
        assert_eq!(first, second);
        assert!(same_shape(&parsed[..2], &fields[..2]));
    }
}
