//! Interactive terminal browser.
//!
//! Shows the tables and views of the database on the left and a preview of
//! the selected one on the right, with a streaming log panel below.

mod app;
mod events;
mod logging;
mod ui;

use crate::tui::app::App;
use crate::tui::events::{AppEvent, EventHandler, SharedInputMode, INPUT_MODE_NORMAL};
use crate::tui::logging::TuiLogLayer;
use crate::tui::ui::render;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use litebrowse::{BrowseError, Browser, BrowserConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::atomic::AtomicU8;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Type alias for the terminal backend.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Setup the terminal for TUI mode.
pub fn setup_terminal() -> Result<Tui, BrowseError> {
    enable_raw_mode()
        .map_err(|e| BrowseError::Config(format!("Failed to enable raw mode: {}", e)))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| BrowseError::Config(format!("Failed to enter alternate screen: {}", e)))?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
        .map_err(|e| BrowseError::Config(format!("Failed to create terminal: {}", e)))
}

/// Restore the terminal to normal mode.
pub fn restore_terminal(terminal: &mut Tui) -> Result<(), BrowseError> {
    disable_raw_mode()
        .map_err(|e| BrowseError::Config(format!("Failed to disable raw mode: {}", e)))?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .map_err(|e| BrowseError::Config(format!("Failed to leave alternate screen: {}", e)))?;
    terminal
        .show_cursor()
        .map_err(|e| BrowseError::Config(format!("Failed to show cursor: {}", e)))?;
    Ok(())
}

/// Install a panic hook that restores the terminal before panicking.
fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Run the interactive browser until the user quits.
pub async fn run(config: BrowserConfig) -> Result<(), BrowseError> {
    // Open the database BEFORE setting up the terminal so errors display properly
    let browser =
        Browser::from_connection(config.open()?)?.with_preview_limit(config.preview_limit);

    install_panic_hook();

    let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(100);
    let shared_input_mode: SharedInputMode = Arc::new(AtomicU8::new(INPUT_MODE_NORMAL));

    let (log_tx, mut log_rx) = mpsc::channel::<String>(500);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,litebrowse=debug"));
    if let Err(e) = tracing_subscriber::registry()
        .with(filter)
        .with(TuiLogLayer::new(log_tx))
        .try_init()
    {
        eprintln!("Warning: Failed to set up TUI logging: {}", e);
    }

    tracing::info!(
        "Opened {} ({:?})",
        config.db_path.display(),
        config.path_source
    );

    let mut app = App::new(browser, config.db_path.clone(), shared_input_mode.clone());

    let mut terminal = setup_terminal()?;

    // Spawn log forwarder
    let log_event_tx = event_tx.clone();
    tokio::spawn(async move {
        while let Some(log_line) = log_rx.recv().await {
            if log_event_tx.send(AppEvent::Log(log_line)).await.is_err() {
                break;
            }
        }
    });

    let event_handler = EventHandler::new(event_tx, shared_input_mode);
    tokio::spawn(event_handler.run());

    let result = event_loop(&mut terminal, &mut app, &mut event_rx).await;

    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Tui,
    app: &mut App,
    event_rx: &mut mpsc::Receiver<AppEvent>,
) -> Result<(), BrowseError> {
    loop {
        terminal.draw(|frame| render(frame, &*app))?;

        let Some(event) = event_rx.recv().await else {
            return Ok(());
        };
        if app.handle_event(event) {
            return Ok(());
        }

        // Drain whatever queued up during the last action before redrawing.
        while let Ok(event) = event_rx.try_recv() {
            if app.handle_event(event) {
                return Ok(());
            }
        }
    }
}
