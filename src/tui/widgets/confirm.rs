//! Yes/no confirmation dialog drawn over the current screen.
//!
//! Used for quitting and for destructive monk commands (`server delete`,
//! `tenant delete`, `data delete`, `meta delete`).

use crate::tui::theme;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// How alarming the dialog looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Notice,
    Destructive,
}

pub fn render_confirm_dialog(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    severity: Severity,
) {
    let dialog_width = (area.width as f32 * 0.6).clamp(20.0, 72.0) as u16;
    let dialog_width = dialog_width.min(area.width);
    let message_lines = wrap_text(message, dialog_width.saturating_sub(4) as usize);
    // message + spacer + prompt + borders
    let dialog_height = (message_lines.len() + 4).min(area.height as usize) as u16;
    let dialog_area = center_rect(dialog_width, dialog_height, area);

    frame.render_widget(Clear, dialog_area);

    let (border_color, icon) = match severity {
        Severity::Notice => (theme::AMBER, "⚠"),
        Severity::Destructive => (theme::RED, "☢"),
    };

    let mut lines: Vec<Line> = message_lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, theme::text())))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[Y]", theme::key()),
        Span::raw(" Yes  "),
        Span::styled(
            "[N/ESC]",
            Style::default().fg(theme::RED).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" No"),
    ]));

    let block = Block::default()
        .title(format!(" {icon} {title} "))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::PANEL_BG));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, dialog_area);
}

/// Word-wraps `text` to `max_width` characters per line.
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for line in text.trim().lines() {
        let mut current = String::new();
        for word in line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Centers a rectangle of the given size within the parent area.
pub fn center_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center);
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);

    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
