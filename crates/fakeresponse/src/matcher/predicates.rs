//! Key/regex predicates for query parameters, request bodies and headers.
//!
//! A predicate is a mapping from key to pattern. It matches a request field
//! when the field is a mapping, every key is present in it, and each value,
//! coerced to a string, contains a match for its pattern.

use crate::error::{FakeResponseError, Result};
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

/// Compiled key/regex predicate.
#[derive(Debug, Clone)]
pub enum FieldMatcher {
    /// Every key must be present and its value must match
    Patterns(Vec<(String, Regex)>),
    /// The configured predicate was not a mapping; never matches
    Unsatisfiable,
}

impl FieldMatcher {
    /// Compile a predicate from its configured value.
    ///
    /// `field` names the rule field for error reporting. Pattern values that
    /// are not strings are coerced the same way request values are.
    pub fn compile(field: &'static str, configured: &Value) -> Result<Self> {
        let Value::Object(entries) = configured else {
            return Ok(FieldMatcher::Unsatisfiable);
        };

        let patterns = entries
            .iter()
            .map(|(key, pattern)| {
                Regex::new(&coerce_to_string(pattern))
                    .map(|regex| (key.clone(), regex))
                    .map_err(|source| FakeResponseError::InvalidPattern {
                        field,
                        key: Some(key.clone()),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(FieldMatcher::Patterns(patterns))
    }

    /// Check a request field against this predicate.
    pub fn matches(&self, actual: &Value) -> bool {
        let FieldMatcher::Patterns(patterns) = self else {
            return false;
        };
        let Value::Object(fields) = actual else {
            return false;
        };

        patterns.iter().all(|(key, regex)| {
            fields
                .get(key)
                .is_some_and(|value| regex.is_match(&coerce_to_string(value)))
        })
    }
}

/// String form of a JSON value used for regex testing.
///
/// Strings are used as-is, integral numbers print without a fraction, arrays
/// join their elements with `,` (with `null` elements left empty) and objects
/// become `[object Object]`.
pub fn coerce_to_string(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        Value::Null => Cow::Borrowed("null"),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(format_number(n)),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(|item| match item {
                    Value::Null => Cow::Borrowed(""),
                    other => coerce_to_string(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Borrowed("[object Object]"),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}
