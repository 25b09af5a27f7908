//! Vault-Tec terminal palette.

use crate::mock::{AlertLevel, Health, SchemaStatus};
use crate::tui::screen::StatusLevel;
use ratatui::{
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders},
};

pub const GREEN: Color = Color::Rgb(0, 255, 0);
pub const AMBER: Color = Color::Rgb(255, 176, 0);
pub const SOFT_GREEN: Color = Color::Rgb(34, 197, 94);
pub const DIM: Color = Color::Rgb(0, 128, 0);
pub const RED: Color = Color::Rgb(255, 68, 68);
pub const PANEL_BG: Color = Color::Rgb(26, 26, 26);

pub fn text() -> Style {
    Style::default().fg(GREEN)
}

pub fn dim() -> Style {
    Style::default().fg(DIM)
}

pub fn title() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn key() -> Style {
    Style::default().fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(GREEN)
        .add_modifier(Modifier::BOLD)
}

/// Bordered panel with an amber title.
pub fn panel(title_text: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(Style::default().fg(GREEN))
        .title(format!(" {title_text} "))
        .title_style(title())
}

pub fn status(level: StatusLevel) -> Style {
    let color = match level {
        StatusLevel::Info => AMBER,
        StatusLevel::Success => SOFT_GREEN,
        StatusLevel::Warning => AMBER,
        StatusLevel::Error => RED,
    };
    Style::default().fg(color)
}

pub fn health(health: Health) -> Style {
    match health {
        Health::Ok => Style::default().fg(SOFT_GREEN),
        Health::Warning => Style::default().fg(AMBER),
        Health::Error => Style::default().fg(RED).add_modifier(Modifier::BOLD),
    }
}

pub fn alert(level: AlertLevel) -> Style {
    match level {
        AlertLevel::Info => Style::default().fg(SOFT_GREEN),
        AlertLevel::Warning => Style::default().fg(AMBER),
        AlertLevel::Critical => Style::default().fg(RED).add_modifier(Modifier::BOLD),
    }
}

pub fn schema_status(status: SchemaStatus) -> Style {
    match status {
        SchemaStatus::Deployed => Style::default().fg(SOFT_GREEN),
        SchemaStatus::Testing => Style::default().fg(AMBER),
        SchemaStatus::Draft => dim(),
    }
}
