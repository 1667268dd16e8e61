//! Error types for rule compilation and route loading.

use std::path::PathBuf;

/// Errors raised while adding rules to a store or loading route documents.
///
/// Request-level mismatches are never errors; they only make a rule
/// ineligible for the current call.
#[derive(Debug, thiserror::Error)]
pub enum FakeResponseError {
    #[error("Invalid pattern for {field}{}: {source}", key_suffix(.key))]
    InvalidPattern {
        field: &'static str,
        key: Option<String>,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid call gate 'at': {0} (must be a positive integer)")]
    InvalidCallGate(u64),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Wrong configuration format in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid loader configuration: {0}")]
    Config(String),
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref()
        .map(|k| format!(".{k}"))
        .unwrap_or_default()
}

pub type Result<T, E = FakeResponseError> = std::result::Result<T, E>;
