//! Browsing session over one database connection.
//!
//! [`Browser`] holds the object list, the current object's metadata and
//! preview, and the selection. Frontends drive it and render its state; all
//! database work happens synchronously in the calling thread.

use crate::config::{BrowserConfig, PREVIEW_LIMIT};
use crate::core::schema::{ColumnInfo, ObjectKind};
use crate::error::{BrowseError, Result};
use crate::introspect::{describe, list_objects, SchemaObject};
use crate::mutate::{self, RowContext};
use crate::planner::OverridePlan;
use crate::preview::{load_preview, Preview, Selection};
use rusqlite::Connection;
use tracing::{debug, info};

/// What the insert action ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The selected row was copied.
    Duplicated(OverridePlan),

    /// The preview was empty; a row of defaults was inserted.
    Defaulted(i64),
}

/// Interactive browsing state.
#[derive(Debug)]
pub struct Browser {
    conn: Connection,
    preview_limit: usize,

    all_objects: Vec<SchemaObject>,
    objects: Vec<SchemaObject>,
    filter: String,
    cursor: usize,

    columns: Vec<ColumnInfo>,
    preview: Preview,
    selection: Selection,
}

impl Browser {
    /// Open the configured database and load the first object.
    pub fn open(config: &BrowserConfig) -> Result<Self> {
        let conn = config.open()?;
        let mut browser = Self::from_connection(conn)?.with_preview_limit(config.preview_limit);
        browser.refresh_preview()?;
        Ok(browser)
    }

    /// Wrap an already open connection and list its objects.
    ///
    /// No rows are loaded until [`refresh_preview`](Self::refresh_preview)
    /// or [`select_object`](Self::select_object) is called.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        let mut browser = Self {
            conn,
            preview_limit: PREVIEW_LIMIT,
            all_objects: Vec::new(),
            objects: Vec::new(),
            filter: String::new(),
            cursor: 0,
            columns: Vec::new(),
            preview: Preview::default(),
            selection: Selection::default(),
        };
        browser.all_objects = list_objects(&browser.conn)?;
        browser.apply_filter();
        Ok(browser)
    }

    /// Fetch at most `limit` rows per preview.
    pub fn with_preview_limit(mut self, limit: usize) -> Self {
        self.preview_limit = limit.max(1);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Objects passing the current filter.
    pub fn objects(&self) -> &[SchemaObject] {
        &self.objects
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The object under the cursor.
    pub fn current_object(&self) -> Option<&SchemaObject> {
        self.objects.get(self.cursor)
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Display text of the selected cell.
    pub fn current_cell(&self) -> Option<&str> {
        self.preview
            .row(self.selection.row)?
            .get(self.selection.col)
            .map(String::as_str)
    }

    /// Re-list objects, re-apply the filter, and re-fetch the preview.
    pub fn reload(&mut self) -> Result<()> {
        self.all_objects = list_objects(&self.conn)?;
        info!("Loaded {} tables and views", self.all_objects.len());
        self.apply_filter();
        self.refresh_preview()
    }

    /// Replace the filter and refresh.
    pub fn set_filter(&mut self, filter: &str) -> Result<()> {
        if self.filter == filter {
            return Ok(());
        }
        self.filter = filter.to_string();
        self.apply_filter();
        self.refresh_preview()
    }

    fn apply_filter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.objects = self
            .all_objects
            .iter()
            .filter(|o| needle.is_empty() || o.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        if self.cursor >= self.objects.len() {
            self.cursor = self.objects.len().saturating_sub(1);
        }
    }

    /// Move the object cursor by `delta`, clamped to the list.
    pub fn move_cursor(&mut self, delta: isize) -> Result<()> {
        if self.objects.is_empty() {
            return Ok(());
        }
        let last = self.objects.len() - 1;
        let next = self.cursor.saturating_add_signed(delta).min(last);
        if next != self.cursor {
            self.cursor = next;
            self.selection = Selection::default();
            self.refresh_preview()?;
        }
        Ok(())
    }

    /// Put the cursor on the object called exactly `name`.
    ///
    /// The filter is cleared when it hides the object.
    pub fn select_object(&mut self, name: &str) -> Result<()> {
        if !self.objects.iter().any(|o| o.name == name) && !self.filter.is_empty() {
            self.filter.clear();
            self.apply_filter();
        }
        let idx = self
            .objects
            .iter()
            .position(|o| o.name == name)
            .ok_or_else(|| BrowseError::SchemaMissing(name.to_string()))?;
        self.cursor = idx;
        self.selection = Selection::default();
        self.refresh_preview()
    }

    /// Fetch columns and rows of the current object again.
    ///
    /// The selection is clamped to the new preview.
    pub fn refresh_preview(&mut self) -> Result<()> {
        let Some(object) = self.objects.get(self.cursor).cloned() else {
            self.columns.clear();
            self.preview = Preview::default();
            self.selection = Selection::default();
            return Ok(());
        };

        let loaded = describe(&self.conn, &object.name).and_then(|columns| {
            load_preview(&self.conn, &object.name, object.kind, &columns, self.preview_limit)
                .map(|preview| (columns, preview))
        });
        let (columns, preview) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                // never keep rows that belong to another object
                self.columns.clear();
                self.preview = Preview::default();
                self.selection = Selection::default();
                return Err(e);
            }
        };
        debug!(
            "Preview of {} {}: {} rows, {} columns",
            object.kind,
            object.name,
            preview.len(),
            preview.columns.len()
        );

        self.columns = columns;
        self.preview = preview;
        self.selection.clamp(&self.preview);
        Ok(())
    }

    /// Select a preview row, clamped to range.
    pub fn select_row(&mut self, row: usize) {
        self.selection.row = row;
        self.selection.clamp(&self.preview);
    }

    /// Select a preview column, clamped to range.
    pub fn select_col(&mut self, col: usize) {
        self.selection.col = col;
        self.selection.clamp(&self.preview);
    }

    /// Move the selected cell by the given offsets.
    pub fn move_selection(&mut self, rows: isize, cols: isize) {
        self.selection.row = self.selection.row.saturating_add_signed(rows);
        self.selection.col = self.selection.col.saturating_add_signed(cols);
        self.selection.clamp(&self.preview);
    }

    fn current_table(&self) -> Result<&SchemaObject> {
        self.current_object()
            .ok_or_else(|| BrowseError::Validation("no table selected".to_string()))
    }

    fn row_context(&self) -> Result<RowContext<'_>> {
        let object = self.current_table()?;
        self.selection.validate(&self.preview)?;
        Ok(RowContext::new(
            &object.name,
            &self.columns,
            &self.preview,
            self.selection.row,
        ))
    }

    /// Duplicate the selected row and refresh.
    pub fn duplicate(&mut self) -> Result<OverridePlan> {
        let plan = mutate::duplicate_row(&self.conn, &self.row_context()?)?;
        self.refresh_preview()?;
        Ok(plan)
    }

    /// Duplicate the selected row, or insert a row of defaults when the
    /// preview is empty.
    pub fn insert_row(&mut self) -> Result<InsertOutcome> {
        let object = self.current_table()?;
        if object.kind == ObjectKind::Table && self.preview.is_empty() {
            let rowid = mutate::insert_default_row(&self.conn, &object.name)?;
            self.refresh_preview()?;
            return Ok(InsertOutcome::Defaulted(rowid));
        }
        self.duplicate().map(InsertOutcome::Duplicated)
    }

    /// Delete the selected row and refresh.
    pub fn delete(&mut self) -> Result<usize> {
        let affected = mutate::delete_row(&self.conn, &self.row_context()?)?;
        self.refresh_preview()?;
        Ok(affected)
    }

    /// Write `buffer` into the selected cell and refresh.
    pub fn commit_cell_edit(&mut self, buffer: &str) -> Result<usize> {
        self.selection.validate_cell(&self.preview)?;
        let col = self.selection.col;
        let affected = mutate::commit_cell_edit(&self.conn, &self.row_context()?, col, buffer)?;
        self.refresh_preview()?;
        Ok(affected)
    }

    /// Drop the object under the cursor and reload the object list.
    pub fn drop_current(&mut self) -> Result<(String, ObjectKind)> {
        let name = self.current_table()?.name.clone();
        let kind = mutate::drop_object(&self.conn, &name)?;
        self.selection = Selection::default();
        self.reload()?;
        Ok((name, kind))
    }
}
