//! Route rules: wire format and compiled form.
//!
//! - `types`: serde shapes for rules and route documents
//! - `compiled`: regexes and call gate validated once at add time

mod compiled;
mod types;

pub use compiled::CompiledRule;
pub(crate) use types::NUM_CALLS_FIELD;
pub use types::{RouteDocument, RouteRule};
