//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Number of rows fetched into the preview.
pub const PREVIEW_LIMIT: usize = 10;

/// Environment variable consulted when no path is given on the command line.
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Subdirectory searched after the working directory.
pub const INSTANCE_DIR: &str = "instance";

/// Where the database path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    /// `--db` on the command line.
    Argument,
    /// The `DB_PATH` environment variable.
    Environment,
    /// Newest `.db` file found by directory search.
    Discovered,
}

/// Root configuration for a browsing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,

    /// How `db_path` was resolved.
    pub path_source: PathSource,

    /// Rows fetched into the preview.
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,
}

impl BrowserConfig {
    /// Create a configuration for an explicit path.
    pub fn new(db_path: impl Into<PathBuf>, path_source: PathSource) -> Self {
        Self {
            db_path: db_path.into(),
            path_source,
            preview_limit: PREVIEW_LIMIT,
        }
    }
}

fn default_preview_limit() -> usize {
    PREVIEW_LIMIT
}
