//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::App;
use super::theme;
use super::widgets::{footer::Footer, header::Header, help::HelpOverlay, trace_bar::TraceBar};
use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};
use std::time::Instant;

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme::PANEL_BG)), area);

    let [header_area, status_area, content_area, trace_area, footer_area] = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Status line
        Constraint::Min(3),    // Screen
        Constraint::Length(2), // Command trace
        Constraint::Length(1), // Key bindings
    ])
    .areas(area);

    render_header(frame, header_area, app);
    render_status(frame, status_area, app);
    if let Some(screen) = app.current_screen() {
        screen.render(frame, content_area, &app.context);
    }
    frame.render_widget(TraceBar::new(&app.trace_snapshot(Instant::now())), trace_area);

    let bindings = app.current_bindings();
    frame.render_widget(Footer::new(&bindings), footer_area);

    if app.show_help() {
        render_help(frame, area, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let clock = Local::now().format("%H:%M:%S").to_string();
    let widget = Header::new(&app.context, app.spinner(), clock);
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let Some(status) = app.status() else {
        return;
    };
    let line = Line::from(Span::styled(format!(" {}", status.text), theme::status(status.level)));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    let title = app.current_title();
    let bindings = app.current_bindings();
    let overlay = HelpOverlay::new(&title, &bindings, app.current_domain());
    frame.render_widget(overlay, HelpOverlay::area(area));
}
