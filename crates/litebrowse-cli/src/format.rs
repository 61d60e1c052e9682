//! Text layout helpers for grids shown in the terminal.

/// Narrowest a column is ever shrunk to.
const MIN_COL_WIDTH: usize = 3;

/// Widest a header alone makes a column.
const MAX_HEADER_WIDTH: usize = 20;

/// Widest a cell value alone makes a column.
const MAX_CELL_WIDTH: usize = 40;

/// Cut `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_cell(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 1 {
        return s.chars().take(1).collect();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

/// Column widths for a grid that fits in `max_width` including one space
/// between columns.
///
/// Widths start from the header (3..=20) and grow with the data (up to 40).
/// When the total is too wide, the widest column is narrowed one step at a
/// time, never below three characters.
pub fn column_widths(columns: &[String], rows: &[Vec<String>], max_width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| c.chars().count().clamp(MIN_COL_WIDTH, MAX_HEADER_WIDTH))
        .collect();

    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count().min(MAX_CELL_WIDTH));
        }
    }

    let gaps = widths.len().saturating_sub(1);
    let mut total: usize = widths.iter().sum::<usize>() + gaps;
    while total > max_width {
        let widest = widths
            .iter_mut()
            .filter(|w| **w > MIN_COL_WIDTH)
            .max_by_key(|w| **w);
        match widest {
            Some(w) => {
                *w -= 1;
                total -= 1;
            }
            None => break,
        }
    }

    widths
}

/// Render a header and rows as a plain fixed-width table.
pub fn render_grid(columns: &[String], rows: &[Vec<String>], max_width: usize) -> String {
    let widths = column_widths(columns, rows, max_width);
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<width$}", truncate_cell(cell, *w), width = *w))
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end()
            .to_string()
    };

    let mut out = line(columns);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(" "),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&line(row));
    }
    out
}
