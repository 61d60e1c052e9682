//! Schema metadata types for tables, views, columns, and unique indexes.
//!
//! Everything here is derived from the engine on demand and never cached
//! across structural changes; see [`crate::introspect`].

use crate::affinity::{classify, Affinity};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of a schema object listed by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    View,
}

impl ObjectKind {
    /// Normalize the `type` column of `sqlite_schema`.
    ///
    /// Anything other than `view` (indexes, triggers sharing a name) is
    /// treated as a table.
    pub fn from_catalog(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("view") {
            ObjectKind::View
        } else {
            ObjectKind::Table
        }
    }

    /// Keyword used in `DROP <keyword> IF EXISTS`.
    pub fn keyword(&self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::View => "VIEW",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Table => f.pad("table"),
            ObjectKind::View => f.pad("view"),
        }
    }
}

/// Column metadata as reported by `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name (case-insensitive for lookup).
    pub name: String,

    /// Declared type, free-form. Empty when the column has no declared type.
    pub decl_type: String,

    /// Position in the primary key: 0 when not part of it, 1..N otherwise.
    pub pk_order: u32,

    /// NOT NULL constraint.
    pub not_null: bool,

    /// Literal text of the DEFAULT clause, if any.
    pub default_value: Option<String>,
}

impl ColumnInfo {
    /// Check if the column participates in the primary key.
    pub fn is_pk(&self) -> bool {
        self.pk_order > 0
    }

    /// Affinity class of the declared type.
    pub fn affinity(&self) -> Affinity {
        classify(&self.decl_type)
    }

    /// Check if the column is a rowid alias (`INTEGER PRIMARY KEY`).
    ///
    /// Only the exact declared type `INTEGER` aliases the rowid; `INT` or
    /// `BIGINT` primary keys are ordinary columns.
    pub fn is_rowid_alias(&self) -> bool {
        self.pk_order == 1 && self.decl_type.trim().eq_ignore_ascii_case("INTEGER")
    }
}

/// A unique index other than the automatic primary-key index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIndex {
    /// Index name.
    pub name: String,

    /// Participating columns in index order.
    pub columns: Vec<String>,
}

/// Full metadata for one table or view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    /// Object name.
    pub name: String,

    /// Table or view.
    pub kind: ObjectKind,

    /// Columns in declaration order.
    pub columns: Vec<ColumnInfo>,

    /// Unique indexes, excluding the primary-key index.
    pub unique_indexes: Vec<UniqueIndex>,
}

/// Check if any column is part of a declared primary key.
pub fn has_explicit_pk(columns: &[ColumnInfo]) -> bool {
    columns.iter().any(ColumnInfo::is_pk)
}

/// Primary key columns ordered by key position.
pub fn pk_columns(columns: &[ColumnInfo]) -> Vec<&ColumnInfo> {
    let mut pk: Vec<&ColumnInfo> = columns.iter().filter(|c| c.is_pk()).collect();
    pk.sort_by_key(|c| c.pk_order);
    pk
}

/// Declared types keyed by lowercased column name.
pub fn column_types(columns: &[ColumnInfo]) -> HashMap<String, String> {
    columns
        .iter()
        .map(|c| (c.name.to_lowercase(), c.decl_type.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_column(name: &str, decl_type: &str, pk_order: u32) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            decl_type: decl_type.to_string(),
            pk_order,
            not_null: false,
            default_value: None,
        }
    }

    #[test]
    fn test_object_kind_normalization() {
        assert_eq!(ObjectKind::from_catalog("view"), ObjectKind::View);
        assert_eq!(ObjectKind::from_catalog("table"), ObjectKind::Table);
        assert_eq!(ObjectKind::from_catalog("index"), ObjectKind::Table);
        assert_eq!(ObjectKind::from_catalog("trigger"), ObjectKind::Table);
    }

    #[test]
    fn test_object_kind_keyword() {
        assert_eq!(ObjectKind::Table.keyword(), "TABLE");
        assert_eq!(ObjectKind::View.keyword(), "VIEW");
        assert_eq!(ObjectKind::View.to_string(), "view");
    }

    #[test]
    fn test_pk_columns_sorted_by_key_order() {
        let cols = vec![
            make_column("b", "INT", 2),
            make_column("x", "TEXT", 0),
            make_column("a", "INT", 1),
        ];
        let pk: Vec<&str> = pk_columns(&cols).iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pk, vec!["a", "b"]);
        assert!(has_explicit_pk(&cols));
    }

    #[test]
    fn test_rowid_alias_requires_exact_integer() {
        assert!(make_column("id", "INTEGER", 1).is_rowid_alias());
        assert!(make_column("id", " integer ", 1).is_rowid_alias());
        assert!(!make_column("id", "INT", 1).is_rowid_alias());
        assert!(!make_column("id", "BIGINT", 1).is_rowid_alias());
        assert!(!make_column("id", "INTEGER", 0).is_rowid_alias());
    }

    #[test]
    fn test_column_types_lowercased_keys() {
        let cols = vec![make_column("Email", "VARCHAR(255)", 0)];
        let types = column_types(&cols);
        assert_eq!(types.get("email").map(String::as_str), Some("VARCHAR(255)"));
        assert!(types.get("Email").is_none());
    }
}
