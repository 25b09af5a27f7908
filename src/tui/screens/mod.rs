//! The Vault-Tec screens and startup routing.

mod filter_builder;
mod json_editor;
mod new_server;
mod overseer;
mod population;
mod quit;
mod record_view;
mod registry;
mod schema_lab;
mod schema_wizard;
mod server_selection;
mod session_selection;
mod tenant_selection;

pub use filter_builder::FilterBuilder;
pub use json_editor::{EditorTarget, JsonEditor};
pub use new_server::NewServer;
pub use overseer::Overseer;
pub use population::Population;
pub use quit::QuitConfirmation;
pub use record_view::RecordView;
pub use registry::Registry;
pub use schema_lab::SchemaLab;
pub use schema_wizard::SchemaWizard;
pub use server_selection::ServerSelection;
pub use session_selection::SessionSelection;
pub use tenant_selection::TenantSelection;

use super::screen::{Context, Screen};
use super::theme;
use crate::config::Config;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use serde_json::Value;
use tracing::warn;

const DEV_USER: &str = "dev-user";
const DEV_VAULT: &str = "dev-vault";
const DEV_SERVER: &str = "dev-server";
const DEV_TENANT: &str = "dev-tenant";

/// Picks the first screen and seeds the context for it.
///
/// `dev_start_screen` wins when it names a known screen. Otherwise overseer
/// mode opens the console as the configured default user, and the normal
/// flow starts at server selection.
pub fn initial_screen(config: &Config) -> (Box<dyn Screen>, Context) {
    let mut ctx = Context::new(config.default_username.clone());

    if let Some(name) = config.dev_start_screen.as_deref() {
        if config.dev_mock_auth {
            ctx.sign_in(&config.default_tenant, &config.default_username);
        }
        let signed_in = |ctx: &mut Context| {
            let tenant = ctx.tenant.clone().unwrap_or_else(|| DEV_VAULT.to_string());
            let user = ctx.username.clone().unwrap_or_else(|| DEV_USER.to_string());
            ctx.sign_in(&tenant, &user);
        };
        let screen: Option<Box<dyn Screen>> = match name.trim().to_ascii_lowercase().as_str() {
            "overseer" => {
                signed_in(&mut ctx);
                Some(Box::new(Overseer::new()))
            }
            "population" => {
                signed_in(&mut ctx);
                Some(Box::new(Population::new()))
            }
            "department" | "registry" => {
                signed_in(&mut ctx);
                Some(Box::new(Registry::new()))
            }
            "schema" | "lab" => {
                signed_in(&mut ctx);
                Some(Box::new(SchemaLab::new()))
            }
            "wizard" | "schema_wizard_1" => {
                signed_in(&mut ctx);
                Some(Box::new(SchemaWizard::new()))
            }
            "server" => Some(Box::new(ServerSelection::new())),
            "tenant" => {
                ctx.server = Some(DEV_SERVER.to_string());
                Some(Box::new(TenantSelection::new(DEV_SERVER)))
            }
            "session" => {
                ctx.server = Some(DEV_SERVER.to_string());
                Some(Box::new(SessionSelection::new(DEV_SERVER, DEV_TENANT)))
            }
            other => {
                warn!(screen = other, "Unknown start screen, using default routing");
                None
            }
        };
        if let Some(screen) = screen {
            return (screen, ctx);
        }
        ctx = Context::new(config.default_username.clone());
    }

    if config.overseer_always {
        ctx.sign_in(&config.default_tenant, &config.default_username);
        (Box::new(Overseer::new()), ctx)
    } else {
        (Box::new(ServerSelection::new()), ctx)
    }
}

/// `1`..`9` as a zero-based row index.
pub(crate) fn digit_index(key: &KeyEvent) -> Option<usize> {
    match key.code {
        KeyCode::Char(c @ '1'..='9') => Some(c as usize - '1' as usize),
        _ => None,
    }
}

/// Moves a list cursor with the arrow keys. Returns true if the key was an arrow.
pub(crate) fn move_cursor(cursor: &mut usize, len: usize, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Up => {
            *cursor = cursor.saturating_sub(1);
            true
        }
        KeyCode::Down => {
            if *cursor + 1 < len {
                *cursor += 1;
            }
            true
        }
        _ => false,
    }
}

/// String field of a JSON object, or `default` when missing or not a string.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str, default: &'a str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Boolean field of a JSON object, false when missing.
pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Items of the array stored under `key` in `value`, empty when absent.
pub(crate) fn array_field<'a>(value: Option<&'a Value>, key: &str) -> &'a [Value] {
    value
        .and_then(|v| v.get(key))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Record identifier, accepting string or numeric ids.
pub(crate) fn record_id(record: &Value) -> Option<String> {
    match record.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Draws a bordered panel with intro lines on top, returning the space left below them.
pub(crate) fn render_frame(frame: &mut Frame, area: Rect, title: &str, intro: Vec<Line>) -> Rect {
    let block = theme::panel(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let intro_height = intro.len() as u16;
    let [top, rest] =
        Layout::vertical([Constraint::Length(intro_height), Constraint::Min(0)]).areas(inner);
    frame.render_widget(Paragraph::new(intro), top);
    rest
}

/// An amber step heading such as `STEP 1 of 3: ...`.
pub(crate) fn heading(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), theme::title()))
}

/// A plain green line.
pub(crate) fn plain(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), theme::text()))
}
