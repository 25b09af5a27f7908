//! Overseer console panels: system status, population, alerts, activity log.

use crate::mock::{with_thousands, Activity, Alert, PopulationStats, SystemStatus};
use crate::tui::theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

pub struct SystemStatusPanel<'a> {
    status: &'a SystemStatus,
}

impl<'a> SystemStatusPanel<'a> {
    pub fn new(status: &'a SystemStatus) -> Self {
        Self { status }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        self.status
            .entries()
            .into_iter()
            .map(|(name, health)| {
                Line::from(vec![
                    Span::styled(format!("{name:<10}"), theme::text()),
                    Span::styled(format!("[{}]", health.label().to_uppercase()), theme::health(health)),
                ])
            })
            .collect()
    }
}

impl Widget for SystemStatusPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(theme::panel("SYSTEM STATUS"))
            .render(area, buf);
    }
}

pub struct PopulationPanel<'a> {
    stats: &'a PopulationStats,
}

impl<'a> PopulationPanel<'a> {
    pub fn new(stats: &'a PopulationStats) -> Self {
        Self { stats }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let row = |label: &str, value: String| {
            Line::from(vec![
                Span::styled(format!("{label:<10}"), theme::text()),
                Span::styled(value, theme::title()),
            ])
        };
        vec![
            row("TOTAL", with_thousands(self.stats.total)),
            row("ACTIVE", with_thousands(self.stats.active)),
            row("OFFLINE", with_thousands(self.stats.offline)),
            Line::from(Span::styled(
                format!("Updated {}", self.stats.last_update),
                theme::dim(),
            )),
        ]
    }
}

impl Widget for PopulationPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(theme::panel("POPULATION"))
            .render(area, buf);
    }
}

pub struct AlertPanel<'a> {
    alerts: &'a [Alert],
}

impl<'a> AlertPanel<'a> {
    pub fn new(alerts: &'a [Alert]) -> Self {
        Self { alerts }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        if self.alerts.is_empty() {
            return vec![Line::from(Span::styled("All systems nominal", theme::dim()))];
        }
        self.alerts
            .iter()
            .map(|alert| {
                Line::from(vec![
                    Span::styled(format!("{} ", alert.timestamp), theme::dim()),
                    Span::styled(format!("{} ", alert.kind), theme::alert(alert.level)),
                    Span::styled(alert.message, theme::text()),
                ])
            })
            .collect()
    }
}

impl Widget for AlertPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(theme::panel("ALERTS"))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct ActivityLog<'a> {
    entries: &'a [Activity],
}

impl<'a> ActivityLog<'a> {
    pub fn new(entries: &'a [Activity]) -> Self {
        Self { entries }
    }

    fn lines(&self) -> Vec<Line<'static>> {
        self.entries
            .iter()
            .map(|entry| {
                Line::from(vec![
                    Span::styled(format!("{} ", entry.timestamp), theme::dim()),
                    Span::styled(format!("{:<14}", entry.module), theme::title()),
                    Span::styled(format!("{:<8}", entry.action), theme::key()),
                    Span::styled(entry.description.clone(), theme::text()),
                    Span::styled(format!("  by {}", entry.user), theme::dim()),
                ])
            })
            .collect()
    }
}

impl Widget for ActivityLog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines())
            .block(theme::panel("ACTIVITY LOG"))
            .render(area, buf);
    }
}
