//! Help overlay: the current screen's keys and the monk commands behind them.

use crate::keys::{monk_command_for, Binding, Domain};
use crate::tui::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
};

pub struct HelpOverlay<'a> {
    title: &'a str,
    bindings: &'a [Binding],
    domain: Option<Domain>,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(title: &'a str, bindings: &'a [Binding], domain: Option<Domain>) -> Self {
        Self {
            title,
            bindings,
            domain,
        }
    }

    /// Calculates the centered area for the help overlay.
    pub fn area(parent: Rect) -> Rect {
        let width = 64.min(parent.width.saturating_sub(4));
        let height = 22.min(parent.height.saturating_sub(4));
        let x = parent.x + (parent.width.saturating_sub(width)) / 2;
        let y = parent.y + (parent.height.saturating_sub(height)) / 2;
        Rect::new(x, y, width, height)
    }

    fn content(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(self.title.to_uppercase(), theme::title())),
            Line::from(""),
        ];
        for binding in self.bindings {
            let mut spans = vec![
                Span::raw("  "),
                Span::styled(format!("{:10}", binding.label()), theme::key()),
                Span::styled(binding.description.to_string(), theme::text()),
            ];
            if let Some(command) = self.domain.and_then(|d| monk_command_for(d, binding.key)) {
                spans.push(Span::styled(format!("  (monk {command})"), theme::dim()));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("GLOBAL", theme::title())));
        for (key, desc) in [("[?]", "Toggle this help"), ("[Q]", "Quit"), ("[CTRL+C]", "Exit now")] {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("{key:10}"), theme::key()),
                Span::styled(desc, theme::text()),
            ]));
        }
        lines
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = theme::panel("HELP (? to close)");
        Paragraph::new(self.content()).block(block).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::crud_bindings;

    #[test]
    fn test_help_area() {
        let parent = Rect::new(0, 0, 100, 50);
        let area = HelpOverlay::area(parent);
        assert!(area.width <= 64);
        assert!(area.height <= 22);
        assert!(area.x > 0);
        assert!(area.y > 0);
    }

    #[test]
    fn test_help_names_monk_commands() {
        let bindings = crud_bindings(true, false, false, false);
        let overlay = HelpOverlay::new("Registry", &bindings, Some(Domain::Server));
        let text: String = overlay
            .content()
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("(monk server list --json)"));
        assert!(text.contains("Toggle this help"));
    }
}
