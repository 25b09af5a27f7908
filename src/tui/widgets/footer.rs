//! Footer: the current screen's killboxes, `[F] Find  [C] Create ...`.

use crate::keys::Binding;
use crate::tui::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

pub struct Footer<'a> {
    bindings: &'a [Binding],
}

impl<'a> Footer<'a> {
    pub fn new(bindings: &'a [Binding]) -> Self {
        Self { bindings }
    }

    pub fn line(&self) -> Line<'static> {
        let mut spans = vec![Span::raw(" ")];
        for binding in self.bindings {
            spans.push(Span::styled(binding.label(), theme::key()));
            spans.push(Span::styled(format!(" {}  ", binding.description), theme::dim()));
        }
        spans.push(Span::styled("[?]", theme::key()));
        spans.push(Span::styled(" Help", theme::dim()));
        Line::from(spans)
    }
}

impl Widget for Footer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        buf.set_line(area.x, area.y, &self.line(), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::crud_bindings;

    #[test]
    fn test_footer_lists_killboxes() {
        let bindings = crud_bindings(true, true, false, false);
        let text: String = Footer::new(&bindings)
            .line()
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("[F] Find"));
        assert!(text.contains("[C] Create"));
        assert!(text.ends_with("[?] Help"));
    }
}
