//! Configuration validation.

use super::BrowserConfig;
use crate::error::{BrowseError, Result};

/// Validate the configuration.
pub fn validate(config: &BrowserConfig) -> Result<()> {
    if config.db_path.as_os_str().is_empty() {
        return Err(BrowseError::Config("database path is empty".into()));
    }
    if !config.db_path.exists() {
        return Err(BrowseError::Config(format!(
            "database file not found: {}",
            config.db_path.display()
        )));
    }
    if !config.db_path.is_file() {
        return Err(BrowseError::Config(format!(
            "database path is not a file: {}",
            config.db_path.display()
        )));
    }
    if config.preview_limit == 0 {
        return Err(BrowseError::Config(
            "preview_limit must be at least 1".into(),
        ));
    }

    Ok(())
}
