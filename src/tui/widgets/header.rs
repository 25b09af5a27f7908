//! Header bar: brand on the left, connection and clock on the right.

use super::spinner::Spinner;
use crate::tui::screen::Context;
use crate::tui::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

pub const BRAND: &str = "VAULT-TEC ENTERPRISE SUITE™";

pub struct Header<'a> {
    context: &'a Context,
    spinner: Option<&'a Spinner>,
    clock: String,
}

impl<'a> Header<'a> {
    pub fn new(context: &'a Context, spinner: Option<&'a Spinner>, clock: impl Into<String>) -> Self {
        Self {
            context,
            spinner,
            clock: clock.into(),
        }
    }

    /// `server • tenant • user • clock`, skipping what is not known yet.
    pub fn connection_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(server) = self.context.server.as_deref() {
            parts.push(server);
        }
        if let Some(tenant) = self.context.tenant.as_deref() {
            parts.push(tenant);
        }
        if let Some(user) = self.context.username.as_deref() {
            parts.push(user);
        }
        parts.push(&self.clock);
        parts.join(" • ")
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let style = Style::default()
            .bg(theme::PANEL_BG)
            .fg(theme::GREEN)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" {BRAND} v{}", env!("CARGO_PKG_VERSION"));
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        if let Some(spinner) = self.spinner {
            let text = spinner.display();
            let width = text.chars().count() as u16;
            let x = area.x + area.width.saturating_sub(width) / 2;
            buf.set_string(x, area.y, &text, style.fg(theme::AMBER));
        }

        let right_text = format!("  {} ", self.connection_text());
        let right_width = right_text.chars().count() as u16;
        if right_width < area.width {
            let x = area.right().saturating_sub(right_width);
            let dot_color = if self.context.authenticated {
                theme::SOFT_GREEN
            } else {
                Color::Gray
            };
            let dot = if self.context.authenticated { "●" } else { "○" };
            buf.set_string(x, area.y, &right_text, style);
            buf.set_string(x, area.y, dot, style.fg(dot_color));
        }
    }
}
