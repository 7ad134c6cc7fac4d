//! Argument literals as JSON.
//!
//! Values are copied without coercion. Enum values become JSON strings, so `orderBy: title`
//! and `orderBy: "title"` give the same arguments. Floats stay JSON numbers when a number
//! prints back exactly as written; otherwise, e.g. `1.10` or `1e400`, the literal text of
//! the query is kept as a string. Without the query text only finite floats can be kept,
//! the others fall back to how `f64` prints them.

use cynic_parser::{executable::Argument, values::FloatValue, Value};
use serde_json::Value as JsonValue;

use crate::arguments::Arguments;

/// What literals are read against: the request variables and the query text.
#[derive(Clone, Copy)]
pub(super) struct LiteralContext<'a> {
    pub variables: Option<&'a Arguments>,
    pub source: Option<&'a str>,
}

/// Copies the literal arguments of a field. Variables resolve against the request
/// variables and are null when missing.
pub(super) fn arguments<'a>(arguments: impl Iterator<Item = Argument<'a>>, context: LiteralContext<'_>) -> Arguments {
    arguments
        .map(|argument| (argument.name().to_owned(), literal(argument.value(), context)))
        .collect()
}

fn literal(value: Value<'_>, context: LiteralContext<'_>) -> JsonValue {
    match value {
        Value::Variable(variable) => context
            .variables
            .and_then(|variables| variables.get(variable.name()))
            .cloned()
            .unwrap_or(JsonValue::Null),
        Value::Int(number) => JsonValue::from(number.as_i64()),
        Value::Float(number) => float(number, context.source),
        Value::String(string) => JsonValue::from(string.as_str()),
        Value::Boolean(boolean) => JsonValue::Bool(boolean.value()),
        Value::Null(_) => JsonValue::Null,
        Value::Enum(value) => JsonValue::from(value.name()),
        Value::List(list) => list.into_iter().map(|item| literal(item, context)).collect(),
        Value::Object(object) => JsonValue::Object(
            object
                .fields()
                .map(|field| (field.name().to_owned(), literal(field.value(), context)))
                .collect(),
        ),
    }
}

fn float(number: FloatValue<'_>, source: Option<&str>) -> JsonValue {
    let span = number.span();
    let written = source.and_then(|source| source.get(span.start..span.end));
    let parsed = serde_json::Number::from_f64(number.as_f64());

    match (parsed, written) {
        (Some(parsed), Some(written)) if parsed.to_string() == written => JsonValue::Number(parsed),
        (_, Some(written)) => JsonValue::from(written),
        (Some(parsed), None) => JsonValue::Number(parsed),
        (None, None) => JsonValue::from(number.to_string()),
    }
}
