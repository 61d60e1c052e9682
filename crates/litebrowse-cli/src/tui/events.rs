//! Event handling for the TUI.
//!
//! Polls crossterm for keys and turns them into [`AppEvent`]s according to the
//! current input mode, which the app shares through an atomic.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Application events that drive state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Quit the application.
    Quit,

    /// Periodic tick for UI updates.
    Tick,

    /// Log line from tracing.
    Log(String),

    // --- Navigation ---
    MoveUp,
    MoveDown,
    /// Move right in the grid, or focus the preview from the object list.
    MoveRight,
    /// Move left in the grid, or return to the object list from column 0.
    MoveLeft,

    // --- Actions ---
    /// Start typing a filter for the object list.
    StartFilter,
    /// Start editing the selected cell.
    StartEdit,
    /// Duplicate the selected row, or insert a default row into an empty table.
    Insert,
    /// Delete the selected row, or ask to drop the selected object.
    Delete,
    /// Copy the selected cell to the clipboard.
    Copy,
    /// Re-read objects and preview from the database.
    Reload,
    /// Toggle log panel expansion.
    ToggleLogs,
    /// Toggle help overlay.
    ToggleHelp,

    // --- Text input (filter and cell edit) ---
    Input(char),
    Backspace,
    Submit,
    /// Leave the current mode or overlay.
    Cancel,

    /// Answer to a yes/no prompt.
    Confirm(bool),
}

/// Shared input mode state (mirrors `InputMode`).
pub type SharedInputMode = Arc<AtomicU8>;

/// Input mode constants for atomic operations.
pub const INPUT_MODE_NORMAL: u8 = 0;
pub const INPUT_MODE_FILTER: u8 = 1;
pub const INPUT_MODE_EDIT: u8 = 2;
pub const INPUT_MODE_CONFIRM: u8 = 3;

/// Event handler that polls for keyboard and tick events.
pub struct EventHandler {
    tx: mpsc::Sender<AppEvent>,
    tick_rate: Duration,
    input_mode: SharedInputMode,
}

impl EventHandler {
    /// Create a new event handler.
    pub fn new(tx: mpsc::Sender<AppEvent>, input_mode: SharedInputMode) -> Self {
        Self {
            tx,
            tick_rate: Duration::from_millis(250),
            input_mode,
        }
    }

    /// Run the event handler loop until the receiver goes away.
    pub async fn run(self) {
        loop {
            if event::poll(self.tick_rate).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    let mode = self.input_mode.load(Ordering::Relaxed);
                    if let Some(app_event) = map_key(key, mode) {
                        if self.tx.send(app_event).await.is_err() {
                            break;
                        }
                    }
                }
            } else if self.tx.send(AppEvent::Tick).await.is_err() {
                break;
            }
        }
    }
}

/// Convert a key press to an app event for the given input mode.
pub fn map_key(key: KeyEvent, mode: u8) -> Option<AppEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(AppEvent::Quit),
            _ => None,
        };
    }

    match mode {
        INPUT_MODE_FILTER | INPUT_MODE_EDIT => match key.code {
            KeyCode::Esc => Some(AppEvent::Cancel),
            KeyCode::Enter => Some(AppEvent::Submit),
            KeyCode::Backspace => Some(AppEvent::Backspace),
            KeyCode::Char(c) => Some(AppEvent::Input(c)),
            _ => None,
        },

        INPUT_MODE_CONFIRM => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(AppEvent::Confirm(true)),
            _ => Some(AppEvent::Confirm(false)),
        },

        _ => match key.code {
            KeyCode::Char('q') => Some(AppEvent::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(AppEvent::MoveDown),
            KeyCode::Char('k') | KeyCode::Up => Some(AppEvent::MoveUp),
            KeyCode::Char('l') | KeyCode::Right => Some(AppEvent::MoveRight),
            KeyCode::Char('h') | KeyCode::Left => Some(AppEvent::MoveLeft),
            KeyCode::Char('/') => Some(AppEvent::StartFilter),
            KeyCode::Char('c') => Some(AppEvent::StartEdit),
            KeyCode::Char('i') => Some(AppEvent::Insert),
            KeyCode::Char('x') => Some(AppEvent::Delete),
            KeyCode::Char('y') => Some(AppEvent::Copy),
            KeyCode::Char('r') => Some(AppEvent::Reload),
            KeyCode::Char('L') => Some(AppEvent::ToggleLogs),
            KeyCode::Char('?') => Some(AppEvent::ToggleHelp),
            KeyCode::Esc => Some(AppEvent::Cancel),
            _ => None,
        },
    }
}
