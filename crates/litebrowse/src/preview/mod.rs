//! Bounded preview of a table's rows and the selection inside it.

use crate::core::identifier::{find_column, quote_ident};
use crate::core::schema::{has_explicit_pk, ColumnInfo, ObjectKind};
use crate::core::value::{as_rowid, format_value};
use crate::error::{BrowseError, Result};
use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

/// Formatted rows of the current object.
///
/// `row_ids` is present only when the rows were fetched together with the
/// implicit rowid, and then holds exactly one id per row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Preview {
    /// Column names as returned by the engine, without the injected rowid.
    pub columns: Vec<String>,

    /// Display values, one inner vector per row.
    pub rows: Vec<Vec<String>>,

    /// Implicit row identifiers parallel to `rows`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_ids: Option<Vec<i64>>,
}

impl Preview {
    /// Check if the preview has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Display values of one row.
    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// Display value of `column` (case-insensitive) in `row`.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = find_column(&self.columns, column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Implicit row id of `row`, if row ids were captured.
    pub fn row_id(&self, row: usize) -> Option<i64> {
        self.row_ids.as_ref()?.get(row).copied()
    }

    /// Seed row view over `row`, used when duplicating it.
    pub fn seed(&self, row: usize) -> Option<SeedRow<'_>> {
        let values = self.rows.get(row)?;
        Some(SeedRow {
            columns: &self.columns,
            values,
        })
    }
}

/// Read-only view of one preview row addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct SeedRow<'a> {
    columns: &'a [String],
    values: &'a [String],
}

impl<'a> SeedRow<'a> {
    /// Build a seed row from parallel column and value slices.
    pub fn new(columns: &'a [String], values: &'a [String]) -> Self {
        Self { columns, values }
    }

    /// Current display value of `column` (case-insensitive).
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let idx = find_column(self.columns, column)?;
        self.values.get(idx).map(String::as_str)
    }
}

/// Fetch up to `limit` rows of `name`.
///
/// Tables without an explicit primary key are read as `SELECT rowid, *` and
/// the leading rowid is moved out of the display into `row_ids`. Views are
/// never read with a rowid.
pub fn load_preview(
    conn: &Connection,
    name: &str,
    kind: ObjectKind,
    columns: &[ColumnInfo],
    limit: usize,
) -> Result<Preview> {
    let mut with_rowid = kind == ObjectKind::Table && !has_explicit_pk(columns);
    let sql = if with_rowid {
        format!("SELECT rowid, * FROM {} LIMIT {}", quote_ident(name)?, limit)
    } else {
        format!("SELECT * FROM {} LIMIT {}", quote_ident(name)?, limit)
    };
    debug!("{}", sql);

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| BrowseError::schema("preview", e))?;
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let display_columns = if with_rowid && names.first().is_some_and(|c| c.eq_ignore_ascii_case("rowid")) {
        names[1..].to_vec()
    } else {
        with_rowid = false;
        names.clone()
    };
    let start = usize::from(with_rowid);

    let mut rows = Vec::new();
    let mut row_ids = Vec::new();
    let mut cursor = stmt
        .query([])
        .map_err(|e| BrowseError::schema("preview", e))?;
    while let Some(row) = cursor.next().map_err(|e| BrowseError::schema("preview", e))? {
        if with_rowid {
            let id = row
                .get_ref(0)
                .map_err(|e| BrowseError::schema("preview", e))?;
            row_ids.push(as_rowid(id));
        }
        let mut record = Vec::with_capacity(names.len() - start);
        for i in start..names.len() {
            let value = row
                .get_ref(i)
                .map_err(|e| BrowseError::schema("preview", e))?;
            record.push(format_value(value));
        }
        rows.push(record);
    }

    Ok(Preview {
        columns: display_columns,
        rows,
        row_ids: with_rowid.then_some(row_ids),
    })
}

/// Selected cell in the preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub row: usize,
    pub col: usize,
}

impl Selection {
    /// Pull both indices back into range after the preview changed.
    ///
    /// An empty preview leaves them at zero.
    pub fn clamp(&mut self, preview: &Preview) {
        if self.row >= preview.rows.len() {
            self.row = preview.rows.len().saturating_sub(1);
        }
        if self.col >= preview.columns.len() {
            self.col = preview.columns.len().saturating_sub(1);
        }
    }

    /// Check that the selection points at an existing row.
    pub fn validate(&self, preview: &Preview) -> Result<()> {
        if self.row >= preview.rows.len() {
            return Err(BrowseError::Validation("no row selected".to_string()));
        }
        Ok(())
    }

    /// Check that the selection points at an existing cell.
    pub fn validate_cell(&self, preview: &Preview) -> Result<()> {
        self.validate(preview)?;
        if self.col >= preview.columns.len() {
            return Err(BrowseError::Validation("no column selected".to_string()));
        }
        Ok(())
    }
}
