use super::types::RouteRule;
use crate::error::{FakeResponseError, Result};
use crate::matcher::FieldMatcher;
use regex::Regex;
use serde_json::Value;
use std::num::NonZeroU64;

/// Rule predicates compiled for evaluation.
///
/// Compilation fails on the first malformed pattern, so a rule that made it
/// into a store can always be evaluated.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub route: Regex,
    pub query_params: Option<FieldMatcher>,
    pub payload: Option<FieldMatcher>,
    pub required_headers: Option<FieldMatcher>,
    pub at: Option<NonZeroU64>,
}

impl CompiledRule {
    pub fn compile(rule: &RouteRule) -> Result<Self> {
        let route = Regex::new(&rule.route).map_err(|source| FakeResponseError::InvalidPattern {
            field: "route",
            key: None,
            source,
        })?;

        let at = rule
            .at
            .map(|at| NonZeroU64::new(at).ok_or(FakeResponseError::InvalidCallGate(at)))
            .transpose()?;

        Ok(CompiledRule {
            route,
            query_params: compile_field("queryParams", rule.query_params.as_ref())?,
            payload: compile_field("payload", rule.payload.as_ref())?,
            required_headers: compile_field("requiredHeaders", rule.required_headers.as_ref())?,
            at,
        })
    }

    pub fn is_gated(&self) -> bool {
        self.at.is_some()
    }
}

/// Falsy values (`null`, `false`, `0`, `""`) leave the field unchecked.
fn compile_field(
    field: &'static str,
    configured: Option<&Value>,
) -> Result<Option<FieldMatcher>> {
    configured
        .filter(|configured| !is_falsy(configured))
        .map(|configured| FieldMatcher::compile(field, configured))
        .transpose()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compile_plain_rule() {
        let compiled = CompiledRule::compile(&RouteRule::new("^/users/\\d+$")).unwrap();
        assert!(compiled.route.is_match("/users/12"));
        assert!(compiled.query_params.is_none());
        assert!(compiled.payload.is_none());
        assert!(compiled.required_headers.is_none());
        assert!(!compiled.is_gated());
    }

    #[test]
    fn test_compile_rejects_bad_route() {
        let err = CompiledRule::compile(&RouteRule::new("/users/(")).unwrap_err();
        assert!(matches!(
            err,
            FakeResponseError::InvalidPattern { field: "route", key: None, .. }
        ));
    }

    #[test]
    fn test_compile_rejects_bad_matcher_pattern() {
        let rule = RouteRule::new("/p").with_payload(json!({"name": "[bob"}));
        let err = CompiledRule::compile(&rule).unwrap_err();
        assert!(matches!(
            err,
            FakeResponseError::InvalidPattern { field: "payload", .. }
        ));
    }

    #[test]
    fn test_compile_rejects_zero_call_gate() {
        let err = CompiledRule::compile(&RouteRule::new("/p").with_at(0)).unwrap_err();
        assert!(matches!(err, FakeResponseError::InvalidCallGate(0)));
    }

    #[test]
    fn test_falsy_predicates_are_skipped() {
        for falsy in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            let rule = RouteRule::new("/p")
                .with_query_params(falsy.clone())
                .with_payload(falsy.clone())
                .with_required_headers(falsy);
            let compiled = CompiledRule::compile(&rule).unwrap();
            assert!(compiled.query_params.is_none());
            assert!(compiled.payload.is_none());
            assert!(compiled.required_headers.is_none());
        }
    }

    #[test]
    fn test_truthy_non_mapping_predicate_never_matches() {
        let rule = RouteRule::new("/p").with_payload(json!("bob"));
        let compiled = CompiledRule::compile(&rule).unwrap();
        assert!(matches!(compiled.payload, Some(FieldMatcher::Unsatisfiable)));
    }

    #[test]
    fn test_compile_call_gate() {
        let compiled = CompiledRule::compile(&RouteRule::new("/p").with_at(3)).unwrap();
        assert_eq!(compiled.at.map(NonZeroU64::get), Some(3));
        assert!(compiled.is_gated());
    }
}
