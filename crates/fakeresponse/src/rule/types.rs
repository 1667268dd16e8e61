//! Wire-level rule definitions.
//!
//! These are the shapes found in route documents. They are compiled into
//! [`CompiledRule`](super::CompiledRule) when added to a store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name of the per-rule call counter in serialized output.
pub(crate) const NUM_CALLS_FIELD: &str = "numCalls";

/// A single fake-response rule.
///
/// Only `route`, `queryParams`, `payload`, `requiredHeaders` and `at` take part
/// in matching. Every other field (status code, response body, ...) is kept in
/// `extra` and handed back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteRule {
    /// Regular expression searched for in the request path
    pub route: String,
    /// Query parameter name -> regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Value>,
    /// Request body field -> regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Header name -> regex
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_headers: Option<Value>,
    /// Only match on this call number (1-based)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<u64>,
    /// Response data and anything else the engine does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RouteRule {
    /// Create a rule matching `route` with no further predicates.
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            query_params: None,
            payload: None,
            required_headers: None,
            at: None,
            extra: Map::new(),
        }
    }

    pub fn with_query_params(mut self, query_params: Value) -> Self {
        self.query_params = Some(query_params);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_required_headers(mut self, headers: Value) -> Self {
        self.required_headers = Some(headers);
        self
    }

    pub fn with_at(mut self, at: u64) -> Self {
        self.at = Some(at);
        self
    }

    /// Attach an opaque field (e.g. `statusCode`, `body`).
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A route document: `{"routes": [...]}`. Other top-level fields are ignored,
/// but `routes` itself is required.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RouteDocument {
    pub routes: Vec<RouteRule>,
}
