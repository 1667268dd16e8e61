//! Route matching engine for fake HTTP responses.
//!
//! A [`RuleStore`] holds an ordered list of [`RouteRule`]s. Each rule names a
//! route regex plus optional query, payload and header predicates and an
//! optional call gate (`at`). [`RuleStore::find_match`] picks the rule that
//! answers a request and counts every rule whose route matched the path.
//!
//! # Example
//!
//! ```
//! use fakeresponse::{MatchRequest, RouteRule, RuleStore};
//! use serde_json::json;
//!
//! let store = RuleStore::new();
//! store
//!     .load_all(vec![
//!         RouteRule::new("^/users$").with_extra("response", json!([])),
//!         RouteRule::new("^/users$").with_at(2).with_extra("code", json!(500)),
//!     ])
//!     .unwrap();
//!
//! let first = store.find_match(&MatchRequest::new("/users")).unwrap();
//! assert!(first.at().is_none());
//!
//! // The second call hits the gated rule.
//! let second = store.find_match(&MatchRequest::new("/users")).unwrap();
//! assert_eq!(second.at(), Some(2));
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod rule;
pub mod store;

pub use config::LoaderConfig;
pub use error::{FakeResponseError, Result};
pub use loader::{load_document, preload};
pub use matcher::{header_map, select_candidate, MatchRequest};
pub use rule::{RouteDocument, RouteRule};
pub use store::{RuleStore, StoredRule};
