//! Request matching against a [`RuleStore`].
//!
//! Matching scans every rule in insertion order. A rule whose route matches
//! the request path has its call counter bumped straight away, before any
//! other predicate is looked at, so a rule can be counted without being
//! selected. Rules that also pass their query, payload, header and call-gate
//! checks become candidates, and [`select_candidate`] picks the result.
//!
//! # Module Structure
//!
//! - `request`: request descriptor, target and query-string parsing
//! - `predicates`: key/regex predicates and value coercion

mod predicates;
mod request;

pub use predicates::{coerce_to_string, FieldMatcher};
pub use request::{header_map, parse_query_string, parse_uri, MatchRequest, ParsedUri};

use crate::store::{RuleStore, StoredRule};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

impl RuleStore {
    /// Find the rule that answers `request`, if any.
    ///
    /// Every rule whose route matches the path is counted as called, whether
    /// or not it ends up selected.
    pub fn find_match(&self, request: &MatchRequest) -> Option<Arc<StoredRule>> {
        let ParsedUri { path, query } = parse_uri(&request.uri);
        let query = Value::Object(query);

        let rules = self.rules.read();
        let candidates: Vec<&Arc<StoredRule>> = rules
            .iter()
            .filter(|rule| evaluate(rule, &path, &query, &request.body, &request.headers))
            .collect();

        let selected = select_candidate(candidates, |rule| rule.compiled().is_gated()).cloned();
        match &selected {
            Some(rule) => debug!(
                path = %path,
                route = %rule.route(),
                num_calls = rule.num_calls(),
                "Matched rule"
            ),
            None => debug!(path = %path, "No rule matched"),
        }
        selected
    }
}

/// Evaluate one rule against a request, counting the call on a path match.
fn evaluate(rule: &StoredRule, path: &str, query: &Value, body: &Value, headers: &Value) -> bool {
    let compiled = rule.compiled();
    if !compiled.route.is_match(path) {
        return false;
    }

    let call = rule.touch();

    let checks = [
        ("queryParams", compiled.query_params.as_ref(), query),
        ("payload", compiled.payload.as_ref(), body),
        ("requiredHeaders", compiled.required_headers.as_ref(), headers),
    ];
    for (field, matcher, actual) in checks {
        if let Some(matcher) = matcher {
            if !matcher.matches(actual) {
                debug!(route = %rule.route(), call, field, "Predicate did not match");
                return false;
            }
        }
    }

    match compiled.at {
        Some(at) if at.get() != call => {
            debug!(route = %rule.route(), call, at = at.get(), "Call gate closed");
            false
        }
        _ => true,
    }
}

/// Pick the result from the candidates of a single match, in store order.
///
/// The first candidate is taken. A later candidate replaces the current
/// choice only when it is gated (`is_gated` returns true). As a result a
/// gated match beats any plain match, the last gated candidate wins among
/// several, and the first plain candidate wins among plain ones.
pub fn select_candidate<T, I, F>(candidates: I, is_gated: F) -> Option<T>
where
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> bool,
{
    candidates
        .into_iter()
        .fold(None, |selected, candidate| match selected {
            None => Some(candidate),
            Some(_) if is_gated(&candidate) => Some(candidate),
            kept => kept,
        })
}
