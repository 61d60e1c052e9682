//! Database path resolution and session configuration.

mod types;
mod validation;

pub use types::*;

use crate::error::{BrowseError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info};

impl BrowserConfig {
    /// Resolve the database path and validate the result.
    ///
    /// Precedence: explicit argument, then `env_path` (normally `DB_PATH`),
    /// then the newest `.db` file in `cwd`, then in `cwd/instance`.
    pub fn resolve(arg: Option<PathBuf>, env_path: Option<PathBuf>, cwd: &Path) -> Result<Self> {
        let config = if let Some(path) = arg.filter(|p| !p.as_os_str().is_empty()) {
            Self::new(path, PathSource::Argument)
        } else if let Some(path) = env_path.filter(|p| !p.as_os_str().is_empty()) {
            Self::new(path, PathSource::Environment)
        } else if let Some(path) = newest_db_in_dir(cwd) {
            Self::new(path, PathSource::Discovered)
        } else if let Some(path) = newest_db_in_dir(&cwd.join(INSTANCE_DIR)) {
            Self::new(path, PathSource::Discovered)
        } else {
            return Err(BrowseError::Config(format!(
                "no SQLite .db file found. Pass --db <path>, set {}, or place a .db in the current directory or in '{}/'",
                DB_PATH_ENV, INSTANCE_DIR
            )));
        };

        config.validate()?;
        debug!(
            "Resolved database path {} ({:?})",
            config.db_path.display(),
            config.path_source
        );
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Open the database read-write. The file is never created.
    pub fn open(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.db_path, flags).map_err(|e| {
            BrowseError::Config(format!(
                "failed to open {}: {}",
                self.db_path.display(),
                e
            ))
        })?;
        info!("Opened database {}", self.db_path.display());
        Ok(conn)
    }
}

/// Most recently modified `.db` file directly inside `dir`.
///
/// Not recursive. Unreadable directories and entries are skipped.
pub fn newest_db_in_dir(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in entries.flatten() {
        let path = entry.path();
        let is_db = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("db"));
        if !is_db {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, p)| p)
}
