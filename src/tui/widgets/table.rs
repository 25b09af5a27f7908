//! Killbox table: numbered rows with `[1]`..`[9]` hints and a cursor.
//!
//! Column widths are sized from the content and capped, then scaled down
//! when the table is wider than the area.

use crate::tui::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Width of the `[n] ` prefix.
const KILLBOX_WIDTH: usize = 4;

/// One table cell with an optional style override.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub style: Option<Style>,
}

impl Cell {
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }
}

impl<T: Into<String>> From<T> for Cell {
    fn from(text: T) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }
}

pub struct KillboxTable<'a> {
    headers: &'a [&'a str],
    rows: &'a [Vec<Cell>],
    selected: Option<usize>,
    empty_text: &'a str,
}

impl<'a> KillboxTable<'a> {
    pub fn new(headers: &'a [&'a str], rows: &'a [Vec<Cell>]) -> Self {
        Self {
            headers,
            rows,
            selected: None,
            empty_text: "(no records)",
        }
    }

    pub fn selected(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn empty_text(mut self, text: &'a str) -> Self {
        self.empty_text = text;
        self
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|h| h.chars().count().max(MIN_COLUMN_WIDTH))
            .collect();
        for row in self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.text.chars().count());
            }
        }
        widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
    }

    /// Truncates to `max_width` characters, with an ellipsis if cut.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let head: String = s.chars().take(max_width - 3).collect();
            format!("{head}...")
        }
    }

    fn killbox(index: usize) -> String {
        if index < 9 {
            format!("[{}] ", index + 1)
        } else {
            " ".repeat(KILLBOX_WIDTH)
        }
    }

    pub fn render_to_lines(&self, available_width: usize) -> Vec<Line<'static>> {
        if self.rows.is_empty() {
            return vec![Line::from(Span::styled(self.empty_text.to_string(), theme::dim()))];
        }

        let widths = self.column_widths();
        let total: usize = KILLBOX_WIDTH + widths.iter().sum::<usize>() + widths.len() * 2;
        let scale = if total > available_width && available_width > 0 {
            available_width as f64 / total as f64
        } else {
            1.0
        };
        let widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        let mut lines = Vec::with_capacity(self.rows.len() + 2);
        let mut header = vec![Span::raw(" ".repeat(KILLBOX_WIDTH))];
        for (name, &width) in self.headers.iter().zip(&widths) {
            header.push(Span::styled(
                format!("{:width$}  ", Self::truncate(name, width)),
                theme::title(),
            ));
        }
        lines.push(Line::from(header));
        let rule_width = KILLBOX_WIDTH + widths.iter().map(|w| w + 2).sum::<usize>();
        lines.push(Line::from(Span::styled("─".repeat(rule_width), theme::dim())));

        for (index, row) in self.rows.iter().enumerate() {
            let is_selected = self.selected == Some(index);
            let mut spans = vec![Span::styled(Self::killbox(index), theme::key())];
            for (cell, &width) in row.iter().zip(&widths) {
                let style = if is_selected {
                    theme::selected()
                } else {
                    cell.style.unwrap_or_else(theme::text)
                };
                spans.push(Span::styled(
                    format!("{:width$}  ", Self::truncate(&cell.text, width)),
                    style,
                ));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}

impl Widget for KillboxTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = self.render_to_lines(area.width as usize);
        for (i, line) in lines.iter().enumerate().take(area.height as usize) {
            buf.set_line(area.x, area.y + i as u16, line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<Cell>> {
        vec![
            vec!["local".into(), "http://localhost:9001".into()],
            vec!["prod".into(), "https://api.vault-tec.example".into()],
        ]
    }

    #[test]
    fn test_column_widths() {
        let rows = rows();
        let table = KillboxTable::new(&["NAME", "ENDPOINT"], &rows);
        assert_eq!(table.column_widths(), vec![5, 29]);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(KillboxTable::truncate("hello", 10), "hello");
        assert_eq!(KillboxTable::truncate("hello world", 8), "hello...");
        assert_eq!(KillboxTable::truncate("hello", 3), "hel");
        assert_eq!(KillboxTable::truncate("☢☢☢☢☢", 4), "☢...");
    }

    #[test]
    fn test_render_to_lines() {
        let rows = rows();
        let table = KillboxTable::new(&["NAME", "ENDPOINT"], &rows).selected(Some(1));
        let lines = table.render_to_lines(80);
        // header, rule, two rows
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2].spans[0].content, "[1] ");
        assert_eq!(lines[3].spans[1].style, theme::selected());
    }

    #[test]
    fn test_empty_table() {
        let table = KillboxTable::new(&["NAME"], &[]).empty_text("No servers configured.");
        let lines = table.render_to_lines(80);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].content, "No servers configured.");
    }

    #[test]
    fn test_killbox_only_for_first_nine() {
        assert_eq!(KillboxTable::killbox(0), "[1] ");
        assert_eq!(KillboxTable::killbox(8), "[9] ");
        assert_eq!(KillboxTable::killbox(9), "    ");
    }
}
