//! The screen contract.
//!
//! A screen owns its own state and never touches the terminal or the bridge
//! directly. It reacts to keys, ticks and command results by returning
//! [`Action`]s; the [`App`](super::app::App) applies them. A result is routed
//! back together with the [`MonkCommand`] that produced it, so screens match
//! on the command to know what they asked for.

use crate::keys::{Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use serde_json::Value;
use std::time::Instant;

/// Identity of a screen, for routing and headless assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenId {
    ServerSelection,
    NewServer,
    TenantSelection,
    SessionSelection,
    Overseer,
    Registry,
    SchemaLab,
    Population,
    FilterBuilder,
    RecordView,
    SchemaWizard,
    JsonEditor,
    QuitConfirmation,
}

impl ScreenId {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ServerSelection => "server_selection",
            Self::NewServer => "new_server",
            Self::TenantSelection => "tenant_selection",
            Self::SessionSelection => "session_selection",
            Self::Overseer => "overseer",
            Self::Registry => "registry",
            Self::SchemaLab => "schema_lab",
            Self::Population => "population",
            Self::FilterBuilder => "filter_builder",
            Self::RecordView => "record_view",
            Self::SchemaWizard => "schema_wizard",
            Self::JsonEditor => "json_editor",
            Self::QuitConfirmation => "quit_confirmation",
        }
    }
}

/// Who is connected where. Shared by all screens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub server: Option<String>,
    pub tenant: Option<String>,
    pub username: Option<String>,
    pub authenticated: bool,
    /// Pre-filled on the login form.
    pub default_username: String,
    /// Filter left by the filter builder for the population screen.
    pub query_filter: Option<Value>,
}

impl Context {
    pub fn new(default_username: impl Into<String>) -> Self {
        Self {
            default_username: default_username.into(),
            ..Self::default()
        }
    }

    /// Records a successful login.
    pub fn sign_in(&mut self, tenant: &str, username: &str) {
        self.tenant = Some(tenant.to_string());
        self.username = Some(username.to_string());
        self.authenticated = true;
    }

    /// Forgets the session but keeps the selected server.
    pub fn sign_out(&mut self) {
        self.tenant = None;
        self.username = None;
        self.authenticated = false;
    }

    /// `user@tenant`, with placeholders for missing parts.
    pub fn identity(&self) -> String {
        format!(
            "{}@{}",
            self.username.as_deref().unwrap_or("unknown"),
            self.tenant.as_deref().unwrap_or("no-tenant")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// One line of feedback under the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub text: String,
}

/// What a screen asks the app to do.
pub enum Action {
    /// Run a monk command; the result comes back through [`Screen::on_result`].
    Execute(MonkCommand),
    Push(Box<dyn Screen>),
    Pop,
    /// Replace the top screen.
    Replace(Box<dyn Screen>),
    /// Clear the stack and start over from this screen.
    ResetTo(Box<dyn Screen>),
    Status(StatusLevel, String),
    Quit,
}

impl Action {
    pub fn info(text: impl Into<String>) -> Self {
        Self::Status(StatusLevel::Info, text.into())
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::Status(StatusLevel::Success, text.into())
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::Status(StatusLevel::Warning, text.into())
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Status(StatusLevel::Error, text.into())
    }
}

impl std::fmt::Debug for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Execute(command) => write!(f, "Execute({command})"),
            Self::Push(screen) => write!(f, "Push({})", screen.id().as_str()),
            Self::Pop => write!(f, "Pop"),
            Self::Replace(screen) => write!(f, "Replace({})", screen.id().as_str()),
            Self::ResetTo(screen) => write!(f, "ResetTo({})", screen.id().as_str()),
            Self::Status(level, text) => write!(f, "Status({level:?}, {text})"),
            Self::Quit => write!(f, "Quit"),
        }
    }
}

/// A full-screen view on the stack.
pub trait Screen: Send {
    fn id(&self) -> ScreenId;

    /// Panel title.
    fn title(&self) -> String;

    /// Footer and help overlay bindings.
    fn bindings(&self) -> Vec<Binding>;

    /// Resource family, used by the help overlay to name monk commands.
    fn domain(&self) -> Option<Domain> {
        None
    }

    /// True while a text field has focus; global shortcuts are suspended.
    fn captures_text(&self) -> bool {
        false
    }

    /// Called once when the screen is pushed.
    fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
        Vec::new()
    }

    /// Called when a screen above this one is popped.
    fn on_resume(&mut self, _ctx: &mut Context) -> Vec<Action> {
        Vec::new()
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Vec<Action>;

    fn on_result(
        &mut self,
        _command: &MonkCommand,
        _result: &CommandResult,
        _ctx: &mut Context,
    ) -> Vec<Action> {
        Vec::new()
    }

    /// Called on every loop iteration while the screen is on top.
    fn on_tick(&mut self, _now: Instant, _ctx: &mut Context) -> Vec<Action> {
        Vec::new()
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context);

    /// Cursor position in the screen's list, for headless state.
    fn selected(&self) -> Option<usize> {
        None
    }
}

/// Standard status for a failed command: stderr, or `fallback` when it was silent.
pub fn failure_text(prefix: &str, result: &CommandResult, fallback: &str) -> String {
    format!("{prefix}: {}", result.error_or(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_sign_in_out() {
        let mut ctx = Context::new("root");
        ctx.server = Some("local".into());
        ctx.sign_in("vault-101", "overseer");
        assert!(ctx.authenticated);
        assert_eq!(ctx.identity(), "overseer@vault-101");

        ctx.sign_out();
        assert!(!ctx.authenticated);
        assert_eq!(ctx.server.as_deref(), Some("local"));
        assert_eq!(ctx.identity(), "unknown@no-tenant");
        assert_eq!(ctx.default_username, "root");
    }

    #[test]
    fn test_failure_text() {
        let silent = CommandResult::from_process(1, "", "");
        assert_eq!(
            failure_text("Ping failed", &silent, "monk CLI unavailable"),
            "Ping failed: monk CLI unavailable"
        );
        let loud = CommandResult::from_process(1, "", "connection refused\n");
        assert_eq!(
            failure_text("Ping failed", &loud, "monk CLI unavailable"),
            "Ping failed: connection refused"
        );
    }
}
