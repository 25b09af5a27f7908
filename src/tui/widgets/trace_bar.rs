//! Two-line trace of monk traffic: `CMD:` above `RSP:`.

use crate::tui::theme;
use crate::tui::trace::TraceSnapshot;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

pub struct TraceBar<'a> {
    snapshot: &'a TraceSnapshot,
}

impl<'a> TraceBar<'a> {
    pub fn new(snapshot: &'a TraceSnapshot) -> Self {
        Self { snapshot }
    }

    fn line(tag: &'static str, text: Option<&str>) -> Line<'static> {
        match text {
            Some(text) => Line::from(vec![
                Span::styled(format!(" {tag} "), theme::key()),
                Span::styled(text.to_string(), theme::text()),
            ]),
            None => Line::from(Span::styled(format!(" {tag}"), theme::dim())),
        }
    }
}

impl Widget for TraceBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = [
            Self::line("CMD:", self.snapshot.command.as_deref()),
            Self::line("RSP:", self.snapshot.response.as_deref()),
        ];
        for (i, line) in lines.iter().enumerate().take(area.height as usize) {
            buf.set_line(area.x, area.y + i as u16, line, area.width);
        }
    }
}
