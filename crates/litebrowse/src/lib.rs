//! # litebrowse
//!
//! Terminal browser core for a single SQLite database file.
//!
//! This library provides the pieces behind the `litebrowse` binary:
//!
//! - **Introspection** of tables, views, columns, and unique indexes
//! - **Bounded previews** that capture the implicit rowid when a table has
//!   no declared primary key
//! - **Row identification** shared by every row-level mutation
//! - **Constraint-aware duplication** that copies a row "as new" without
//!   violating its primary key or unique indexes
//! - **Mutations**: cell edits, row deletes, default inserts, drops
//!
//! ## Example
//!
//! ```rust,no_run
//! use litebrowse::{Browser, BrowserConfig};
//!
//! fn main() -> litebrowse::Result<()> {
//!     let config = BrowserConfig::resolve(None, None, std::path::Path::new("."))?;
//!     let mut browser = Browser::open(&config)?;
//!     browser.select_object("users")?;
//!     let plan = browser.duplicate()?;
//!     println!("Overrode {} columns", plan.overrides().len());
//!     Ok(())
//! }
//! ```

pub mod affinity;
pub mod browser;
pub mod config;
pub mod core;
pub mod error;
pub mod introspect;
pub mod mutate;
pub mod planner;
pub mod preview;
pub mod rowid;

// Re-exports for convenient access
pub use affinity::Affinity;
pub use browser::{Browser, InsertOutcome};
pub use config::{BrowserConfig, PathSource};
pub use crate::core::schema::{ColumnInfo, ObjectKind, TableSchema, UniqueIndex};
pub use crate::core::value::SqlValue;
pub use error::{BrowseError, Result};
pub use introspect::SchemaObject;
pub use mutate::RowContext;
pub use planner::OverridePlan;
pub use preview::{Preview, Selection};
pub use rowid::{RowFilter, RowKey};
