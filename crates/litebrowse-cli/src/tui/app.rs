//! Application state for the TUI.
//!
//! Follows the Elm architecture pattern:
//! - Model: App struct containing all application state
//! - Update: handle_event method that transforms state based on events
//! - View: Separate ui module renders state to terminal
//!
//! Database work runs synchronously inside `handle_event`. A failed action
//! only changes the status line.

use crate::clipboard::copy_to_clipboard;
use crate::tui::events::{
    AppEvent, SharedInputMode, INPUT_MODE_CONFIRM, INPUT_MODE_EDIT, INPUT_MODE_FILTER,
    INPUT_MODE_NORMAL,
};
use litebrowse::{BrowseError, Browser, InsertOutcome, ObjectKind};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::Ordering;

/// Maximum number of log lines to keep in memory.
const MAX_LOG_LINES: usize = 1000;

/// Input mode for the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keyboard shortcuts active.
    #[default]
    Normal,
    /// Typing the object filter.
    Filter,
    /// Typing a new cell value.
    Edit,
    /// Waiting for y/n.
    Confirm,
}

impl InputMode {
    fn shared(self) -> u8 {
        match self {
            InputMode::Normal => INPUT_MODE_NORMAL,
            InputMode::Filter => INPUT_MODE_FILTER,
            InputMode::Edit => INPUT_MODE_EDIT,
            InputMode::Confirm => INPUT_MODE_CONFIRM,
        }
    }
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Objects,
    Preview,
}

/// Message shown on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub message: String,
    pub is_error: bool,
}

impl Status {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_error: true,
        }
    }
}

/// Main application state.
pub struct App {
    /// Browsing session over the open database.
    pub browser: Browser,

    /// Path shown in the title bar.
    pub db_path: PathBuf,

    pub focus: Focus,

    /// Current input mode (local copy for rendering).
    pub input_mode: InputMode,

    /// Shared input mode state (synced with EventHandler).
    shared_input_mode: SharedInputMode,

    /// Filter text while typing it.
    pub filter_input: String,

    /// Cell value while editing it.
    pub edit_buffer: String,

    /// Object awaiting drop confirmation.
    pub pending_drop: Option<(String, ObjectKind)>,

    pub status: Status,

    /// Log output buffer (ring buffer).
    pub logs: VecDeque<String>,

    /// Log panel scroll offset.
    pub log_scroll: usize,

    /// Whether log panel is expanded.
    pub log_expanded: bool,

    /// Whether help overlay is shown.
    pub show_help: bool,
}

impl App {
    /// Create the app and load the first preview.
    ///
    /// A preview that fails to load is reported on the status line.
    pub fn new(mut browser: Browser, db_path: PathBuf, shared_input_mode: SharedInputMode) -> Self {
        let status = match browser.refresh_preview() {
            Ok(()) => Status::info(format!(
                "{} tables and views. Press ? for help.",
                browser.objects().len()
            )),
            Err(e) => Status::error(e.to_string()),
        };
        shared_input_mode.store(INPUT_MODE_NORMAL, Ordering::Relaxed);

        Self {
            browser,
            db_path,
            focus: Focus::Objects,
            input_mode: InputMode::Normal,
            shared_input_mode,
            filter_input: String::new(),
            edit_buffer: String::new(),
            pending_drop: None,
            status,
            logs: VecDeque::with_capacity(MAX_LOG_LINES),
            log_scroll: 0,
            log_expanded: false,
            show_help: false,
        }
    }

    /// Handle an event. Returns `true` when the app should quit.
    pub fn handle_event(&mut self, event: AppEvent) -> bool {
        let result = match event {
            AppEvent::Quit => return true,
            AppEvent::Tick => Ok(()),
            AppEvent::Log(line) => {
                self.add_log(line);
                Ok(())
            }

            AppEvent::MoveDown => self.move_vertical(1),
            AppEvent::MoveUp => self.move_vertical(-1),
            AppEvent::MoveRight => {
                self.move_right();
                Ok(())
            }
            AppEvent::MoveLeft => {
                self.move_left();
                Ok(())
            }

            AppEvent::StartFilter => {
                self.filter_input = self.browser.filter().to_string();
                self.set_mode(InputMode::Filter);
                Ok(())
            }
            AppEvent::StartEdit => {
                self.start_edit();
                Ok(())
            }
            AppEvent::Insert => self.insert(),
            AppEvent::Delete => self.delete(),
            AppEvent::Copy => {
                self.copy_cell();
                Ok(())
            }
            AppEvent::Reload => self.browser.reload().map(|()| {
                self.status = Status::info("Reloaded");
            }),
            AppEvent::ToggleLogs => {
                self.log_expanded = !self.log_expanded;
                Ok(())
            }
            AppEvent::ToggleHelp => {
                self.show_help = !self.show_help;
                Ok(())
            }

            AppEvent::Input(c) => self.input(c),
            AppEvent::Backspace => self.backspace(),
            AppEvent::Submit => self.submit(),
            AppEvent::Cancel => self.cancel(),
            AppEvent::Confirm(yes) => self.confirm(yes),
        };

        if let Err(e) = result {
            self.set_error(&e);
        }
        false
    }

    fn set_mode(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.shared_input_mode.store(mode.shared(), Ordering::Relaxed);
    }

    fn set_error(&mut self, e: &BrowseError) {
        self.status = Status::error(e.to_string());
    }

    fn move_vertical(&mut self, delta: isize) -> Result<(), BrowseError> {
        match self.focus {
            Focus::Objects => self.browser.move_cursor(delta),
            Focus::Preview => {
                self.browser.move_selection(delta, 0);
                Ok(())
            }
        }
    }

    fn move_right(&mut self) {
        match self.focus {
            Focus::Objects => {
                if !self.browser.preview().columns.is_empty() {
                    self.focus = Focus::Preview;
                }
            }
            Focus::Preview => self.browser.move_selection(0, 1),
        }
    }

    fn move_left(&mut self) {
        if self.focus == Focus::Preview {
            if self.browser.selection().col == 0 {
                self.focus = Focus::Objects;
            } else {
                self.browser.move_selection(0, -1);
            }
        }
    }

    fn start_edit(&mut self) {
        if self.focus != Focus::Preview {
            self.status = Status::info("Focus the preview (→) to edit a cell");
            return;
        }
        match self.browser.current_cell() {
            Some(value) => {
                self.edit_buffer = value.to_string();
                self.set_mode(InputMode::Edit);
            }
            None => self.status = Status::error("no cell selected"),
        }
    }

    fn insert(&mut self) -> Result<(), BrowseError> {
        if self.focus != Focus::Preview {
            self.status = Status::info("Focus the preview (→) to insert a row");
            return Ok(());
        }
        let outcome = self.browser.insert_row()?;
        self.status = match outcome {
            InsertOutcome::Duplicated(plan) => {
                let mut changed: Vec<&String> = plan.changed().iter().collect();
                changed.sort();
                let changed: Vec<&str> = changed.into_iter().map(String::as_str).collect();
                if changed.is_empty() {
                    Status::info("Row duplicated")
                } else {
                    Status::info(format!("Row duplicated (new {})", changed.join(", ")))
                }
            }
            InsertOutcome::Defaulted(rowid) => {
                Status::info(format!("Inserted default row {}", rowid))
            }
        };
        Ok(())
    }

    fn delete(&mut self) -> Result<(), BrowseError> {
        match self.focus {
            Focus::Preview => {
                let affected = self.browser.delete()?;
                self.status = Status::info(format!("Deleted {} row(s)", affected));
                if self.browser.preview().is_empty() {
                    self.focus = Focus::Objects;
                }
            }
            Focus::Objects => {
                let Some(object) = self.browser.current_object() else {
                    return Err(BrowseError::Validation("no table selected".to_string()));
                };
                let prompt = format!("drop {} {}? (y/n)", object.kind, object.name);
                self.pending_drop = Some((object.name.clone(), object.kind));
                self.status = Status::info(prompt);
                self.set_mode(InputMode::Confirm);
            }
        }
        Ok(())
    }

    fn confirm(&mut self, yes: bool) -> Result<(), BrowseError> {
        self.set_mode(InputMode::Normal);
        let Some((name, _)) = self.pending_drop.take() else {
            return Ok(());
        };
        if !yes {
            self.status = Status::info("Drop cancelled");
            return Ok(());
        }
        // The cursor may have moved since the prompt.
        if self.browser.current_object().map(|o| o.name.as_str()) != Some(name.as_str()) {
            self.browser.select_object(&name)?;
        }
        let (name, kind) = self.browser.drop_current()?;
        self.status = Status::info(format!("Dropped {} {}", kind, name));
        Ok(())
    }

    fn copy_cell(&mut self) {
        let Some(value) = self.browser.current_cell() else {
            self.status = Status::error("no cell selected");
            return;
        };
        self.status = match copy_to_clipboard(value) {
            Ok(()) => Status::info("Copied cell to clipboard"),
            Err(e) => Status::error(format!("copy failed: {}", e)),
        };
    }

    fn input(&mut self, c: char) -> Result<(), BrowseError> {
        match self.input_mode {
            InputMode::Filter => {
                self.filter_input.push(c);
                let filter = self.filter_input.clone();
                self.browser.set_filter(&filter)
            }
            InputMode::Edit => {
                self.edit_buffer.push(c);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn backspace(&mut self) -> Result<(), BrowseError> {
        match self.input_mode {
            InputMode::Filter => {
                self.filter_input.pop();
                let filter = self.filter_input.clone();
                self.browser.set_filter(&filter)
            }
            InputMode::Edit => {
                self.edit_buffer.pop();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn submit(&mut self) -> Result<(), BrowseError> {
        match self.input_mode {
            InputMode::Filter => {
                self.set_mode(InputMode::Normal);
                self.status = Status::info(format!("{} matches", self.browser.objects().len()));
                Ok(())
            }
            InputMode::Edit => {
                self.set_mode(InputMode::Normal);
                let buffer = std::mem::take(&mut self.edit_buffer);
                self.browser.commit_cell_edit(&buffer)?;
                self.status = Status::info("Cell updated");
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn cancel(&mut self) -> Result<(), BrowseError> {
        match self.input_mode {
            InputMode::Filter => {
                self.set_mode(InputMode::Normal);
                self.filter_input.clear();
                self.browser.set_filter("")
            }
            InputMode::Edit => {
                self.set_mode(InputMode::Normal);
                self.edit_buffer.clear();
                self.status = Status::info("Edit cancelled");
                Ok(())
            }
            _ => {
                self.show_help = false;
                Ok(())
            }
        }
    }

    /// Add a log line.
    pub fn add_log(&mut self, line: String) {
        if self.logs.len() >= MAX_LOG_LINES {
            self.logs.pop_front();
        }
        self.logs.push_back(line);
        // Auto-scroll to bottom
        self.log_scroll = self.logs.len().saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::atomic::AtomicU8;
    use std::sync::Arc;

    fn app(sql: &str) -> App {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        let browser = Browser::from_connection(conn).unwrap();
        App::new(
            browser,
            PathBuf::from(":memory:"),
            Arc::new(AtomicU8::new(INPUT_MODE_NORMAL)),
        )
    }

    const SCHEMA: &str = "CREATE TABLE t (id INTEGER PRIMARY KEY, note TEXT);
                          INSERT INTO t VALUES (1, 'hi');
                          CREATE VIEW v AS SELECT note FROM t;";

    fn count(app: &App) -> i64 {
        app.browser
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_edit_cell_to_null() {
        let mut app = app(SCHEMA);
        app.handle_event(AppEvent::MoveRight);
        app.handle_event(AppEvent::MoveRight);
        app.handle_event(AppEvent::StartEdit);
        assert_eq!(app.input_mode, InputMode::Edit);
        assert_eq!(app.edit_buffer, "hi");

        for _ in 0..2 {
            app.handle_event(AppEvent::Backspace);
        }
        for c in "null".chars() {
            app.handle_event(AppEvent::Input(c));
        }
        app.handle_event(AppEvent::Submit);

        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.status.is_error, "{}", app.status.message);
        assert_eq!(app.browser.current_cell(), Some("NULL"));
    }

    #[test]
    fn test_insert_duplicates_row() {
        let mut app = app(SCHEMA);
        app.handle_event(AppEvent::MoveRight);
        app.handle_event(AppEvent::Insert);
        assert_eq!(count(&app), 2);
        assert_eq!(app.status.message, "Row duplicated (new id)");
    }

    #[test]
    fn test_insert_ignored_while_object_list_focused() {
        let mut app = app(SCHEMA);
        assert_eq!(app.focus, Focus::Objects);
        app.handle_event(AppEvent::Insert);
        assert_eq!(count(&app), 1);
        assert!(!app.status.is_error);
        assert_eq!(app.status.message, "Focus the preview (→) to insert a row");
    }

    #[test]
    fn test_failed_action_sets_error_status() {
        let mut app = app(SCHEMA);
        app.handle_event(AppEvent::MoveDown);
        assert_eq!(app.browser.current_object().unwrap().name, "v");
        app.handle_event(AppEvent::MoveRight);
        app.handle_event(AppEvent::Delete);
        assert!(app.status.is_error);
        assert_eq!(app.status.message, "cannot resolve row identifier");
        assert_eq!(count(&app), 1);
    }

    #[test]
    fn test_drop_requires_confirmation() {
        let mut app = app(SCHEMA);
        app.handle_event(AppEvent::MoveDown);
        app.handle_event(AppEvent::Delete);
        assert_eq!(app.input_mode, InputMode::Confirm);
        assert_eq!(app.status.message, "drop view v? (y/n)");

        app.handle_event(AppEvent::Confirm(false));
        assert_eq!(app.browser.objects().len(), 2);

        app.handle_event(AppEvent::Delete);
        app.handle_event(AppEvent::Confirm(true));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.browser.objects().len(), 1);
        assert_eq!(app.status.message, "Dropped view v");
    }

    #[test]
    fn test_filter_typing_and_cancel() {
        let mut app = app(SCHEMA);
        app.handle_event(AppEvent::StartFilter);
        app.handle_event(AppEvent::Input('v'));
        assert_eq!(app.browser.objects().len(), 1);
        app.handle_event(AppEvent::Cancel);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.browser.objects().len(), 2);
    }

    #[test]
    fn test_quit() {
        let mut app = app(SCHEMA);
        assert!(!app.handle_event(AppEvent::Tick));
        assert!(app.handle_event(AppEvent::Quit));
    }

    #[test]
    fn test_log_ring_buffer() {
        let mut app = app(SCHEMA);
        for i in 0..(MAX_LOG_LINES + 5) {
            app.add_log(format!("line {}", i));
        }
        assert_eq!(app.logs.len(), MAX_LOG_LINES);
        assert_eq!(app.logs.front().map(String::as_str), Some("line 5"));
        assert_eq!(app.log_scroll, MAX_LOG_LINES - 1);
    }
}
