//! Configuration for the route loader.

use crate::error::{FakeResponseError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory searched when no routes directory is configured: the route
/// documents bundled with this crate.
pub const DEFAULT_ROUTES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/default_routes");

fn default_routes_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ROUTES_DIR)
}

/// Where route documents are read from.
///
/// ```yaml
/// routesDir: ./fixtures/routes
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    /// Directory containing `*.json` route documents
    #[serde(default = "default_routes_dir")]
    pub routes_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
        }
    }
}

impl LoaderConfig {
    pub fn new(routes_dir: impl Into<PathBuf>) -> Self {
        Self {
            routes_dir: routes_dir.into(),
        }
    }

    /// Read a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| FakeResponseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: LoaderConfig = serde_yaml::from_str(&contents).map_err(|e| {
            FakeResponseError::Config(format!("{}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Check that the routes directory exists and is a directory.
    pub fn validate(&self) -> Result<()> {
        if !self.routes_dir.is_dir() {
            return Err(FakeResponseError::Config(format!(
                "routes directory '{}' does not exist or is not a directory",
                self.routes_dir.display()
            )));
        }
        Ok(())
    }
}
