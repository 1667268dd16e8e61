//! Request descriptors and request-target parsing.

use serde_json::{Map, Value};

/// The parts of an incoming request that rules are matched against.
///
/// `body` and `headers` default to `null`, which fails any `payload` or
/// `requiredHeaders` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub uri: String,
    pub body: Value,
    pub headers: Value,
}

impl MatchRequest {
    /// Describe a request by its target (path plus optional query string).
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            body: Value::Null,
            headers: Value::Null,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = headers;
        self
    }
}

/// Build a header object from name/value pairs.
///
/// Names are lower-cased the way HTTP servers present them, so rules should
/// use lower-case keys in `requiredHeaders`. A repeated name keeps its last
/// value.
pub fn header_map<I, K, V>(pairs: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let headers: Map<String, Value> = pairs
        .into_iter()
        .map(|(name, value)| {
            (
                name.as_ref().to_ascii_lowercase(),
                Value::String(value.into()),
            )
        })
        .collect();
    Value::Object(headers)
}

/// A request target split into path and query parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedUri {
    pub path: String,
    pub query: Map<String, Value>,
}

/// Split a request target into its path and decoded query parameters.
///
/// Absolute-form targets (`http://host/path?x=1`) are reduced to their path
/// and any fragment is dropped. An empty path becomes `/`. The path itself is
/// left percent-encoded.
pub fn parse_uri(uri: &str) -> ParsedUri {
    let without_fragment = uri.split_once('#').map_or(uri, |(before, _)| before);
    let (target, query) = match without_fragment.split_once('?') {
        Some((target, query)) => (target, Some(query)),
        None => (without_fragment, None),
    };

    let path = match target.split_once("://") {
        Some((_, rest)) if !target.starts_with('/') => {
            rest.find('/').map_or("", |slash| &rest[slash..])
        }
        _ => target,
    };

    ParsedUri {
        path: if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        },
        query: query.map(parse_query_string).unwrap_or_default(),
    }
}

/// Parse a query string into a mapping.
///
/// Keys and values are percent-decoded with `+` read as a space. A key without
/// `=` maps to an empty string. A key seen more than once maps to an array of
/// its values in order of appearance.
pub fn parse_query_string(query: &str) -> Map<String, Value> {
    let mut params = Map::new();

    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key);
        let value = Value::String(decode_component(value));

        match params.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key, value);
            }
        }
    }

    params
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_uri_path_only() {
        let parsed = parse_uri("/users/12");
        assert_eq!(parsed.path, "/users/12");
        assert!(parsed.query.is_empty());
    }

    #[test]
    fn test_parse_uri_with_query() {
        let parsed = parse_uri("/a?type=x&page=2");
        assert_eq!(parsed.path, "/a");
        assert_eq!(Value::Object(parsed.query), json!({"type": "x", "page": "2"}));
    }

    #[test]
    fn test_parse_uri_absolute_form() {
        let parsed = parse_uri("http://localhost:3000/api/items?id=1#top");
        assert_eq!(parsed.path, "/api/items");
        assert_eq!(Value::Object(parsed.query), json!({"id": "1"}));

        assert_eq!(parse_uri("http://localhost:3000").path, "/");
        assert_eq!(
            parse_uri("/redirect/http://example.com").path,
            "/redirect/http://example.com"
        );
    }

    #[test]
    fn test_parse_uri_empty_path() {
        let parsed = parse_uri("?q=1");
        assert_eq!(parsed.path, "/");
        assert_eq!(Value::Object(parsed.query), json!({"q": "1"}));
    }

    #[test]
    fn test_parse_uri_drops_fragment() {
        let parsed = parse_uri("/docs#section?not=query");
        assert_eq!(parsed.path, "/docs");
        assert!(parsed.query.is_empty());
    }

    #[test]
    fn test_parse_query_string_decoding() {
        let parsed = parse_query_string("name=John+Smith&city=S%C3%A3o%20Paulo&a%26b=1");
        assert_eq!(
            Value::Object(parsed),
            json!({"name": "John Smith", "city": "São Paulo", "a&b": "1"})
        );
    }

    #[test]
    fn test_parse_query_string_bare_and_empty_pairs() {
        let parsed = parse_query_string("debug&&verbose=&x=1");
        assert_eq!(
            Value::Object(parsed),
            json!({"debug": "", "verbose": "", "x": "1"})
        );
    }

    #[test]
    fn test_parse_query_string_repeated_keys() {
        let parsed = parse_query_string("tag=a&tag=b&tag=c&single=1");
        assert_eq!(
            Value::Object(parsed),
            json!({"tag": ["a", "b", "c"], "single": "1"})
        );
    }

    #[test]
    fn test_parse_query_string_replaces_invalid_utf8() {
        let parsed = parse_query_string("bad=%FF%FE&ok=caf%C3%A9&raw=100%");
        assert_eq!(parsed.get("bad"), Some(&json!("\u{FFFD}\u{FFFD}")));
        assert_eq!(parsed.get("ok"), Some(&json!("café")));
        assert_eq!(parsed.get("raw"), Some(&json!("100%")));
    }

    #[test]
    fn test_header_map_lowercases_names() {
        let headers = header_map([("Content-Type", "application/json"), ("X-Api-Key", "k")]);
        assert_eq!(
            headers,
            json!({"content-type": "application/json", "x-api-key": "k"})
        );
    }

    #[test]
    fn test_match_request_defaults() {
        let request = MatchRequest::new("/users");
        assert_eq!(request.body, Value::Null);
        assert_eq!(request.headers, Value::Null);
    }
}
