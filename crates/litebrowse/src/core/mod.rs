//! Core types shared by every browser operation.
//!
//! - [`identifier`]: identifier validation and quoting
//! - [`schema`]: table, column, and unique-index metadata types
//! - [`value`]: statement parameters and cell display formatting

pub mod identifier;
pub mod schema;
pub mod value;

pub use identifier::{find_column, quote_ident, quote_ident_list};
pub use schema::{ColumnInfo, ObjectKind, TableSchema, UniqueIndex};
pub use value::{SqlValue, NULL_DISPLAY};
