//! Ordered rule store with per-rule call counters.
//!
//! The store is an owned object: create one per fake server (or per test) and
//! share it behind an `Arc` if several threads serve requests. Rules are kept
//! in insertion order and are only ever appended or cleared as a whole.

use crate::error::Result;
use crate::rule::{CompiledRule, RouteRule, NUM_CALLS_FIELD};
use parking_lot::RwLock;
use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A rule held by a [`RuleStore`] together with its live call counter.
#[derive(Debug)]
pub struct StoredRule {
    rule: RouteRule,
    compiled: CompiledRule,
    num_calls: AtomicU64,
}

impl StoredRule {
    fn new(mut rule: RouteRule) -> Result<Self> {
        // The counter belongs to the store; a configured value never survives.
        rule.extra.remove(NUM_CALLS_FIELD);
        let compiled = CompiledRule::compile(&rule)?;
        Ok(Self {
            rule,
            compiled,
            num_calls: AtomicU64::new(0),
        })
    }

    /// The rule as configured, including opaque response fields.
    pub fn rule(&self) -> &RouteRule {
        &self.rule
    }

    pub fn route(&self) -> &str {
        &self.rule.route
    }

    pub fn at(&self) -> Option<u64> {
        self.rule.at
    }

    /// Number of evaluations whose path matched this rule's route.
    pub fn num_calls(&self) -> u64 {
        self.num_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn compiled(&self) -> &CompiledRule {
        &self.compiled
    }

    /// Record a path hit and return the 1-based sequence number of this call.
    pub(crate) fn touch(&self) -> u64 {
        self.num_calls.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Serializes as the configured rule with `numCalls` added.
impl Serialize for StoredRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = serde_json::to_value(&self.rule).map_err(S::Error::custom)?;
        let serde_json::Value::Object(fields) = value else {
            return Err(S::Error::custom("rule did not serialize to an object"));
        };

        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        for (key, value) in &fields {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(NUM_CALLS_FIELD, &self.num_calls())?;
        map.end()
    }
}

/// Insertion-ordered collection of rules.
#[derive(Debug, Default)]
pub struct RuleStore {
    pub(crate) rules: RwLock<Vec<Arc<StoredRule>>>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule with its counter at zero.
    ///
    /// Patterns are compiled here; a malformed regex or an `at` of zero is
    /// rejected and the store is left unchanged.
    pub fn add(&self, rule: RouteRule) -> Result<Arc<StoredRule>> {
        let stored = StoredRule::new(rule).inspect_err(|e| warn!("Rejected rule: {}", e))?;
        let stored = Arc::new(stored);
        let mut rules = self.rules.write();
        rules.push(Arc::clone(&stored));
        debug!(
            route = %stored.route(),
            index = rules.len() - 1,
            "Added rule"
        );
        Ok(stored)
    }

    /// Append every rule in order. Either all rules are added or none are.
    ///
    /// Returns the number of rules added.
    pub fn load_all<I>(&self, rules: I) -> Result<usize>
    where
        I: IntoIterator<Item = RouteRule>,
    {
        let compiled = rules
            .into_iter()
            .map(|rule| StoredRule::new(rule).map(Arc::new))
            .collect::<Result<Vec<_>>>()
            .inspect_err(|e| warn!("Rejected rule set: {}", e))?;

        let count = compiled.len();
        self.rules.write().extend(compiled);
        info!("Loaded {} rule(s)", count);
        Ok(count)
    }

    /// All rules in insertion order.
    ///
    /// The handles share counters with the store, so later matches are
    /// visible through them.
    pub fn all(&self) -> Vec<Arc<StoredRule>> {
        self.rules.read().clone()
    }

    /// Drop every rule and counter.
    pub fn clear(&self) {
        let mut rules = self.rules.write();
        let dropped = rules.len();
        rules.clear();
        info!("Cleared {} rule(s)", dropped);
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_initializes_counter() {
        let store = RuleStore::new();
        let rule = store.add(RouteRule::new("/users")).unwrap();
        assert_eq!(rule.num_calls(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_resets_configured_counter() {
        let store = RuleStore::new();
        let rule = RouteRule::new("/users").with_extra("numCalls", json!(9));
        let stored = store.add(rule).unwrap();
        assert_eq!(stored.num_calls(), 0);
        assert!(!stored.rule().extra.contains_key("numCalls"));
    }

    #[test]
    fn test_add_rejects_malformed_rule() {
        let store = RuleStore::new();
        assert!(store.add(RouteRule::new("(")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_all_preserves_order() {
        let store = RuleStore::new();
        let count = store
            .load_all(vec![
                RouteRule::new("/a"),
                RouteRule::new("/b"),
                RouteRule::new("/a"),
            ])
            .unwrap();
        assert_eq!(count, 3);

        let routes: Vec<_> = store.all().iter().map(|r| r.route().to_string()).collect();
        assert_eq!(routes, ["/a", "/b", "/a"]);
    }

    #[test]
    fn test_load_all_is_all_or_nothing() {
        let store = RuleStore::new();
        store.add(RouteRule::new("/existing")).unwrap();

        let result = store.load_all(vec![
            RouteRule::new("/ok"),
            RouteRule::new("/bad").with_query_params(json!({"q": "*"})),
        ]);
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_empties_store() {
        let store = RuleStore::new();
        store
            .load_all(vec![RouteRule::new("/a"), RouteRule::new("/b")])
            .unwrap();
        store.clear();
        assert!(store.all().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_returns_live_counters() {
        let store = RuleStore::new();
        store.add(RouteRule::new("/a")).unwrap();
        let view = store.all();

        assert_eq!(view[0].touch(), 1);
        assert_eq!(store.all()[0].num_calls(), 1);
        assert_eq!(view[0].num_calls(), 1);
    }

    #[test]
    fn test_serialize_includes_opaque_fields_and_counter() {
        let store = RuleStore::new();
        let stored = store
            .add(
                RouteRule::new("/users")
                    .with_at(2)
                    .with_extra("statusCode", json!(201))
                    .with_extra("body", json!({"id": 1})),
            )
            .unwrap();
        stored.touch();

        let value = serde_json::to_value(&*stored).unwrap();
        assert_eq!(
            value,
            json!({
                "route": "/users",
                "at": 2,
                "statusCode": 201,
                "body": {"id": 1},
                "numCalls": 1
            })
        );
    }
}
