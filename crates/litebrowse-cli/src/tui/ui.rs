//! UI rendering for the TUI.
//!
//! Implements the View function of the Elm architecture - pure rendering
//! from application state to terminal frames.

use crate::format::{column_widths, truncate_cell};
use crate::tui::app::{App, Focus, InputMode};
use litebrowse::ObjectKind;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// Render the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let log_height = if app.log_expanded { 12 } else { 5 };

    // Main layout: title bar, content, logs, input line, footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),          // Title bar
            Constraint::Min(8),             // Content
            Constraint::Length(log_height), // Log panel
            Constraint::Length(1),          // Input / status line
            Constraint::Length(1),          // Footer
        ])
        .split(frame.area());

    render_title_bar(frame, app, main_chunks[0]);
    render_content(frame, app, main_chunks[1]);
    render_logs(frame, app, main_chunks[2]);
    render_status_line(frame, app, main_chunks[3]);
    render_footer(frame, app, main_chunks[4]);

    if app.show_help {
        render_help(frame);
    }
}

/// Render the title bar at the top.
fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let browser = &app.browser;
    let mut spans = vec![
        Span::styled(
            " litebrowse ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(app.db_path.display().to_string()),
    ];

    if let Some(object) = browser.current_object() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{} {}", object.kind, object.name),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::raw(format!(" | {} rows", browser.preview().len())));
    }

    if !browser.filter().is_empty() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("filter: {}", browser.filter()),
            Style::default().fg(Color::Yellow),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(bar, area);
}

/// Render the object list (left) and the preview grid (right).
fn render_content(frame: &mut Frame, app: &App, area: Rect) {
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(30), // Objects
            Constraint::Min(30),    // Preview
        ])
        .split(area);

    render_objects(frame, app, content_chunks[0]);
    render_preview(frame, app, content_chunks[1]);
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
}

fn render_objects(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .browser
        .objects()
        .iter()
        .map(|object| {
            let (tag, color) = match object.kind {
                ObjectKind::Table => ("T", Color::Green),
                ObjectKind::View => ("V", Color::Magenta),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", tag), Style::default().fg(color)),
                Span::raw(object.name.as_str()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(pane_block(
            format!(" Objects ({}) ", app.browser.objects().len()),
            app.focus == Focus::Objects,
        ))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if !app.browser.objects().is_empty() {
        state.select(Some(app.browser.cursor()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_preview(frame: &mut Frame, app: &App, area: Rect) {
    let preview = app.browser.preview();
    let focused = app.focus == Focus::Preview;
    let block = pane_block(" Preview ".to_string(), focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if preview.columns.is_empty() {
        return;
    }

    let widths = column_widths(&preview.columns, &preview.rows, inner.width as usize);
    let selection = app.browser.selection();

    // Keep the selected row on screen.
    let body_height = (inner.height as usize).saturating_sub(2);
    let first_row = if body_height == 0 {
        0
    } else {
        selection.row.saturating_sub(body_height - 1)
    };

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        grid_line(&preview.columns, &widths, |_| header_style),
        Line::styled(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join(" "),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    for (idx, row) in preview.rows.iter().enumerate().skip(first_row).take(body_height) {
        lines.push(grid_line(row, &widths, |col| {
            if idx != selection.row {
                Style::default()
            } else if focused && col == selection.col {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().bg(Color::Black)
            }
        }));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn grid_line<'a>(cells: &[String], widths: &[usize], style: impl Fn(usize) -> Style) -> Line<'a> {
    let mut spans = Vec::with_capacity(cells.len() * 2);
    for (col, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if col > 0 {
            spans.push(Span::raw(" "));
        }
        let text = format!("{:<width$}", truncate_cell(cell, *width), width = *width);
        spans.push(Span::styled(text, style(col)));
    }
    Line::from(spans)
}

/// Render the log panel.
fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = app
        .log_scroll
        .saturating_add(1)
        .saturating_sub(visible)
        .min(app.logs.len());

    let log_lines: Vec<Line> = app
        .logs
        .iter()
        .skip(start)
        .take(visible)
        .map(|line| {
            let style = if line.contains("ERROR") {
                Style::default().fg(Color::Red)
            } else if line.contains("WARN") {
                Style::default().fg(Color::Yellow)
            } else if line.contains("DEBUG") {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::styled(line.as_str(), style)
        })
        .collect();

    let logs = Paragraph::new(log_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Logs ({}) ", app.logs.len())),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(logs, area);
}

/// Render the prompt while typing, otherwise the last status message.
fn render_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.input_mode {
        InputMode::Filter => Line::from(vec![
            Span::styled(" / ", Style::default().fg(Color::Yellow)),
            Span::raw(app.filter_input.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        InputMode::Edit => {
            let column = app
                .browser
                .preview()
                .columns
                .get(app.browser.selection().col)
                .map(String::as_str)
                .unwrap_or("");
            Line::from(vec![
                Span::styled(format!(" {} = ", column), Style::default().fg(Color::Cyan)),
                Span::raw(app.edit_buffer.as_str()),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ])
        }
        InputMode::Confirm | InputMode::Normal => {
            let style = if app.status.is_error {
                Style::default().fg(Color::Red)
            } else if app.input_mode == InputMode::Confirm {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::styled(format!(" {}", app.status.message), style)
        }
    };

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the footer with key hints.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints: &[(&str, &str)] = match app.input_mode {
        InputMode::Filter | InputMode::Edit => {
            &[(" Enter ", " Apply "), (" Esc ", " Cancel ")]
        }
        InputMode::Confirm => &[(" y ", " Yes "), (" n ", " No ")],
        InputMode::Normal => &[
            (" q ", " Quit "),
            (" / ", " Filter "),
            (" i ", " Insert "),
            (" x ", " Delete "),
            (" c ", " Edit "),
            (" y ", " Copy "),
            (" r ", " Reload "),
            (" ? ", " Help "),
        ],
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, label)| {
            [
                Span::styled(*key, Style::default().bg(Color::DarkGray)),
                Span::raw(*label),
            ]
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the help overlay.
fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 70, frame.area());
    frame.render_widget(Clear, area);

    let entries = [
        ("j/k ↑/↓", "Move through objects or rows"),
        ("l/→", "Open preview / next column"),
        ("h/←", "Previous column / back to objects"),
        ("/", "Filter objects by name"),
        ("i", "Duplicate row (default row if empty)"),
        ("x", "Delete row / drop object"),
        ("c", "Edit cell (NULL stores null)"),
        ("y", "Copy cell to clipboard"),
        ("r", "Reload from database"),
        ("L", "Toggle log panel size"),
        ("?", "Toggle this help"),
        ("q", "Quit"),
    ];

    let mut help_text = vec![Line::from("")];
    help_text.extend(entries.iter().map(|(key, desc)| {
        Line::from(vec![
            Span::styled(format!("  {:<9}", key), Style::default().fg(Color::Cyan)),
            Span::raw(*desc),
        ])
    }));
    help_text.push(Line::from(""));

    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .style(Style::default().bg(Color::DarkGray)),
    );

    frame.render_widget(help, area);
}

/// Create a centered rectangle.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
