//! Identification of the selected preview row.
//!
//! Duplicate, delete, and update all locate "the current row" through
//! [`build_where`], so the three can never disagree about which row that is.

use crate::core::identifier::quote_ident;
use crate::core::schema::{pk_columns, ColumnInfo};
use crate::core::value::SqlValue;
use crate::error::{BrowseError, Result};
use crate::preview::Preview;

/// How the selected row is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    /// By the declared primary key columns, in key order.
    Identified(Vec<String>),

    /// By the engine's implicit rowid.
    Implicit(i64),
}

/// A parameterized WHERE expression matching exactly one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    /// Which identification path produced the clause.
    pub key: RowKey,

    /// Expression without the `WHERE` keyword.
    pub clause: String,

    /// Positional parameters for the `?` placeholders in `clause`.
    pub params: Vec<SqlValue>,
}

/// Build the WHERE expression for preview row `row`.
///
/// With a declared primary key the clause is `pk1 = ? AND pk2 = ? ...` in
/// key order, with values taken from the displayed row; a key column missing
/// from the display binds NULL. Without one, the captured rowid is used.
pub fn build_where(columns: &[ColumnInfo], preview: &Preview, row: usize) -> Result<RowFilter> {
    if row >= preview.rows.len() {
        return Err(BrowseError::Validation("no row selected".to_string()));
    }

    let pk = pk_columns(columns);
    if !pk.is_empty() {
        let mut parts = Vec::with_capacity(pk.len());
        let mut params = Vec::with_capacity(pk.len());
        for col in &pk {
            parts.push(format!("{} = ?", quote_ident(&col.name)?));
            params.push(
                preview
                    .cell(row, &col.name)
                    .map(SqlValue::from)
                    .unwrap_or(SqlValue::Null),
            );
        }
        return Ok(RowFilter {
            key: RowKey::Identified(pk.iter().map(|c| c.name.clone()).collect()),
            clause: parts.join(" AND "),
            params,
        });
    }

    match preview.row_id(row) {
        Some(id) => Ok(RowFilter {
            key: RowKey::Implicit(id),
            clause: "rowid = ?".to_string(),
            params: vec![SqlValue::Integer(id)],
        }),
        None => Err(BrowseError::unidentifiable()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(name: &str, decl_type: &str, pk_order: u32) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            decl_type: decl_type.to_string(),
            pk_order,
            not_null: false,
            default_value: None,
        }
    }

    fn preview(columns: &[&str], rows: &[&[&str]], row_ids: Option<Vec<i64>>) -> Preview {
        Preview {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            row_ids,
        }
    }

    #[test]
    fn test_single_pk() {
        let cols = vec![col("id", "INTEGER", 1), col("name", "TEXT", 0)];
        let p = preview(&["id", "name"], &[&["7", "a"]], None);
        let f = build_where(&cols, &p, 0).unwrap();
        assert_eq!(f.clause, "\"id\" = ?");
        assert_eq!(f.params, vec![SqlValue::Text("7".into())]);
        assert_eq!(f.key, RowKey::Identified(vec!["id".into()]));
    }

    #[test]
    fn test_composite_pk_in_key_order() {
        let cols = vec![col("a", "INT", 2), col("b", "INT", 1)];
        let p = preview(&["A", "B"], &[&["1", "2"]], None);
        let f = build_where(&cols, &p, 0).unwrap();
        assert_eq!(f.clause, "\"b\" = ? AND \"a\" = ?");
        assert_eq!(f.params, vec![SqlValue::from("2"), SqlValue::from("1")]);
    }

    #[test]
    fn test_missing_pk_column_binds_null() {
        let cols = vec![col("id", "TEXT", 1)];
        let p = preview(&["other"], &[&["x"]], None);
        let f = build_where(&cols, &p, 0).unwrap();
        assert_eq!(f.params, vec![SqlValue::Null]);
    }

    #[test]
    fn test_rowid_fallback() {
        let cols = vec![col("a", "INT", 0)];
        let p = preview(&["a"], &[&["1"], &["1"]], Some(vec![4, 9]));
        let f = build_where(&cols, &p, 1).unwrap();
        assert_eq!(f.clause, "rowid = ?");
        assert_eq!(f.params, vec![SqlValue::Integer(9)]);
        assert_eq!(f.key, RowKey::Implicit(9));
    }

    #[test]
    fn test_no_pk_and_no_row_ids() {
        let cols = vec![col("a", "INT", 0)];
        let p = preview(&["a"], &[&["1"]], None);
        let err = build_where(&cols, &p, 0).unwrap_err();
        assert!(matches!(err, BrowseError::Identifier(_)));
        assert_eq!(err.to_string(), "cannot resolve row identifier");
    }

    #[test]
    fn test_row_out_of_range() {
        let cols = vec![col("id", "INTEGER", 1)];
        let p = preview(&["id"], &[&["1"]], None);
        assert!(matches!(
            build_where(&cols, &p, 1),
            Err(BrowseError::Validation(_))
        ));
    }
}
