//! Row and object mutations driven from the preview.
//!
//! Every row-level operation addresses its target through
//! [`build_where`](crate::rowid::build_where). Each one is a single
//! statement; a failure leaves the database as it was.

mod duplicate;

pub use duplicate::{build_insert_select, duplicate_row, DuplicateStage, InsertStatement};

use crate::core::identifier::quote_ident;
use crate::core::schema::{ColumnInfo, ObjectKind};
use crate::core::value::SqlValue;
use crate::error::{BrowseError, Result};
use crate::introspect::object_kind;
use crate::preview::Preview;
use crate::rowid::build_where;
use rusqlite::{params_from_iter, Connection};
use tracing::{debug, info};

/// The selected row together with what is needed to address it.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    /// Table the preview was loaded from.
    pub table: &'a str,

    /// Column descriptors the preview was loaded with.
    pub columns: &'a [ColumnInfo],

    pub preview: &'a Preview,

    /// Selected row index into `preview`.
    pub row: usize,
}

impl<'a> RowContext<'a> {
    pub fn new(table: &'a str, columns: &'a [ColumnInfo], preview: &'a Preview, row: usize) -> Self {
        Self {
            table,
            columns,
            preview,
            row,
        }
    }
}

/// Delete the selected row. Returns the number of rows removed.
///
/// A filter that matches nothing is an identifier failure.
pub fn delete_row(conn: &Connection, ctx: &RowContext<'_>) -> Result<usize> {
    let filter = build_where(ctx.columns, ctx.preview, ctx.row)?;
    let sql = format!(
        "DELETE FROM {} WHERE {}",
        quote_ident(ctx.table)?,
        filter.clause
    );
    debug!("{} {:?}", sql, filter.params);

    let affected = conn
        .execute(&sql, params_from_iter(filter.params.iter()))
        .map_err(|e| BrowseError::engine("delete", e))?;
    if affected == 0 {
        return Err(BrowseError::unidentifiable());
    }
    info!("Deleted {} row(s) from {}", affected, ctx.table);
    Ok(affected)
}

/// Interpret an edit buffer as a bound value.
///
/// The literal `NULL` in any case, surrounding whitespace ignored, is SQL
/// NULL. Anything else is bound as the untrimmed text.
pub fn parse_cell_input(buffer: &str) -> SqlValue {
    if buffer.trim().eq_ignore_ascii_case("NULL") {
        SqlValue::Null
    } else {
        SqlValue::Text(buffer.to_string())
    }
}

/// Write `buffer` into column `col` of the selected row.
///
/// Returns the number of rows updated.
pub fn commit_cell_edit(
    conn: &Connection,
    ctx: &RowContext<'_>,
    col: usize,
    buffer: &str,
) -> Result<usize> {
    let column = ctx
        .preview
        .columns
        .get(col)
        .ok_or_else(|| BrowseError::Validation("no column selected".to_string()))?;
    let filter = build_where(ctx.columns, ctx.preview, ctx.row)?;
    let value = parse_cell_input(buffer);

    let sql = format!(
        "UPDATE {} SET {} = ? WHERE {}",
        quote_ident(ctx.table)?,
        quote_ident(column)?,
        filter.clause
    );
    debug!("{} {} {:?}", sql, value, filter.params);

    let params = std::iter::once(&value).chain(filter.params.iter());
    let affected = conn
        .execute(&sql, params_from_iter(params))
        .map_err(|e| BrowseError::engine("update", e))?;
    if affected == 0 {
        return Err(BrowseError::unidentifiable());
    }
    info!("Updated {}.{} on {} row(s)", ctx.table, column, affected);
    Ok(affected)
}

/// Drop a table or view, using the keyword matching its catalog type.
pub fn drop_object(conn: &Connection, name: &str) -> Result<ObjectKind> {
    let kind = object_kind(conn, name)?;
    let sql = format!("DROP {} IF EXISTS {}", kind.keyword(), quote_ident(name)?);
    debug!("{}", sql);

    conn.execute(&sql, [])
        .map_err(|e| BrowseError::engine(format!("drop {}", kind), e))?;
    info!("Dropped {} {}", kind, name);
    Ok(kind)
}

/// Insert a row made only of column defaults.
pub fn insert_default_row(conn: &Connection, table: &str) -> Result<i64> {
    let sql = format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table)?);
    debug!("{}", sql);

    conn.execute(&sql, [])
        .map_err(|e| BrowseError::engine("insert", e))?;
    let rowid = conn.last_insert_rowid();
    info!("Inserted default row {} into {}", rowid, table);
    Ok(rowid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::describe;
    use crate::preview::load_preview;

    fn setup(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
            .unwrap()
    }

    fn snapshot(conn: &Connection, table: &str) -> (Vec<ColumnInfo>, Preview) {
        let cols = describe(conn, table).unwrap();
        let preview = load_preview(conn, table, ObjectKind::Table, &cols, 10).unwrap();
        (cols, preview)
    }

    #[test]
    fn test_parse_cell_input() {
        assert_eq!(parse_cell_input("null"), SqlValue::Null);
        assert_eq!(parse_cell_input("  NuLl "), SqlValue::Null);
        assert_eq!(parse_cell_input(" x "), SqlValue::Text(" x ".into()));
        assert_eq!(parse_cell_input("nullable"), SqlValue::Text("nullable".into()));
        assert_eq!(parse_cell_input(""), SqlValue::Text(String::new()));
    }

    #[test]
    fn test_delete_by_pk() {
        let conn = setup(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT);
             INSERT INTO t VALUES (1, 'a'), (2, 'b');",
        );
        let (cols, preview) = snapshot(&conn, "t");
        let n = delete_row(&conn, &RowContext::new("t", &cols, &preview, 1)).unwrap();
        assert_eq!(n, 1);
        let left: String = conn.query_row("SELECT name FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(left, "a");
    }

    #[test]
    fn test_delete_duplicate_rows_by_rowid() {
        let conn = setup(
            "CREATE TABLE r (a INT, b TEXT);
             INSERT INTO r VALUES (1, 'k'), (1, 'k');",
        );
        let (cols, preview) = snapshot(&conn, "r");
        delete_row(&conn, &RowContext::new("r", &cols, &preview, 0)).unwrap();
        assert_eq!(count(&conn, "r"), 1);
        let id: i64 = conn.query_row("SELECT rowid FROM r", [], |r| r.get(0)).unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn test_delete_without_row_ids_fails() {
        let conn = setup(
            "CREATE TABLE r (a INT);
             INSERT INTO r VALUES (1);",
        );
        let cols = describe(&conn, "r").unwrap();
        let preview = load_preview(&conn, "r", ObjectKind::View, &cols, 10).unwrap();
        let err = delete_row(&conn, &RowContext::new("r", &cols, &preview, 0)).unwrap_err();
        assert!(matches!(err, BrowseError::Identifier(_)));
        assert_eq!(count(&conn, "r"), 1);
    }

    #[test]
    fn test_commit_cell_edit_text_and_affinity() {
        let conn = setup(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, qty INT, note TEXT);
             INSERT INTO t VALUES (1, 3, 'hi');",
        );
        let (cols, preview) = snapshot(&conn, "t");
        let ctx = RowContext::new("t", &cols, &preview, 0);
        commit_cell_edit(&conn, &ctx, 1, "42").unwrap();
        commit_cell_edit(&conn, &ctx, 2, "there").unwrap();

        let (qty, note): (i64, String) = conn
            .query_row("SELECT qty, note FROM t WHERE id = 1", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(qty, 42);
        assert_eq!(note, "there");
    }

    #[test]
    fn test_commit_cell_edit_bad_column() {
        let conn = setup("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);");
        let (cols, preview) = snapshot(&conn, "t");
        let ctx = RowContext::new("t", &cols, &preview, 0);
        assert!(matches!(
            commit_cell_edit(&conn, &ctx, 4, "x"),
            Err(BrowseError::Validation(_))
        ));
    }

    #[test]
    fn test_commit_cell_edit_not_null_violation() {
        let conn = setup(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
             INSERT INTO t VALUES (1, 'a');",
        );
        let (cols, preview) = snapshot(&conn, "t");
        let ctx = RowContext::new("t", &cols, &preview, 0);
        let err = commit_cell_edit(&conn, &ctx, 1, "NULL").unwrap_err();
        assert!(matches!(err, BrowseError::Engine { .. }));
        assert!(err.to_string().starts_with("update error:"));
    }

    #[test]
    fn test_drop_uses_matching_keyword() {
        let conn = setup(
            "CREATE TABLE t (a INT);
             CREATE VIEW v AS SELECT a FROM t;",
        );
        assert_eq!(drop_object(&conn, "v").unwrap(), ObjectKind::View);
        assert_eq!(drop_object(&conn, "t").unwrap(), ObjectKind::Table);
        assert!(matches!(
            drop_object(&conn, "t"),
            Err(BrowseError::SchemaMissing(_))
        ));
    }

    #[test]
    fn test_insert_default_row() {
        let conn = setup("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT DEFAULT 'anon');");
        let id = insert_default_row(&conn, "t").unwrap();
        assert_eq!(id, 1);
        let name: String = conn.query_row("SELECT name FROM t", [], |r| r.get(0)).unwrap();
        assert_eq!(name, "anon");
    }
}
