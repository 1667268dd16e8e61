//! Route document loading.
//!
//! A routes directory holds `*.json` files shaped like
//! `{"routes": [{"route": "/users", ...}]}`. Files are read in file-name
//! order and each file's rules are appended to the store in document order.

use crate::config::LoaderConfig;
use crate::error::{FakeResponseError, Result};
use crate::rule::RouteDocument;
use crate::store::RuleStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load every route document in the configured directory.
///
/// An unreadable or malformed file is skipped and the remaining files are
/// still loaded. If any file failed, the first failure is returned once every
/// file has been tried. Returns the number of rules loaded.
pub fn preload(store: &RuleStore, config: &LoaderConfig) -> Result<usize> {
    config.validate()?;
    let dir = &config.routes_dir;
    info!("Loading routes from {}", dir.display());

    let mut loaded = 0;
    let mut first_error = None;
    for file in route_files(dir)? {
        match load_file(store, &file) {
            Ok(count) => {
                debug!(file = %file.display(), rules = count, "Loaded route document");
                loaded += count;
            }
            Err(e) => {
                warn!("Wrong configuration format: {}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    info!("Loaded {} rule(s) from {}", loaded, dir.display());
    match first_error {
        Some(e) => Err(e),
        None => Ok(loaded),
    }
}

fn load_file(store: &RuleStore, file: &Path) -> Result<usize> {
    let contents = std::fs::read_to_string(file).map_err(|source| FakeResponseError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    load_from(store, &contents, file)
}

/// Parse a single route document and append its rules.
pub fn load_document(store: &RuleStore, json: &str) -> Result<usize> {
    load_from(store, json, Path::new("<inline>"))
}

fn load_from(store: &RuleStore, json: &str, source: &Path) -> Result<usize> {
    let document: RouteDocument =
        serde_json::from_str(json).map_err(|source_err| FakeResponseError::Parse {
            path: source.to_path_buf(),
            source: source_err,
        })?;
    store.load_all(document.routes)
}

/// `*.json` files directly inside `dir`, sorted by name.
fn route_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|source| FakeResponseError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            let is_json = path.is_file() && path.extension().is_some_and(|ext| ext == "json");
            if !is_json {
                debug!(path = %path.display(), "Skipping non-route file");
            }
            is_json
        })
        .collect();
    files.sort();
    Ok(files)
}
