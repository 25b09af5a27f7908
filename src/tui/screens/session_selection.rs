use super::{heading, plain, render_frame, str_field, Overseer};
use crate::keys::{self, Binding};
use crate::monk::{CommandResult, MonkCommand};
use crate::session::session_still_valid;
use crate::tui::screen::{Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::input::{InputField, TextInput};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::{Duration, Instant};

/// How long an existing session is shown before it is used automatically.
pub const AUTO_PROCEED_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Username,
    Password,
    /// No field focused; `s` and `Enter` act on the screen.
    Actions,
}

/// Step 3 of 3: reuse a valid session or log in.
#[derive(Debug)]
pub struct SessionSelection {
    server: String,
    tenant: String,
    username: TextInput,
    password: TextInput,
    focus: Focus,
    /// User of a still-valid session on this tenant.
    existing: Option<String>,
    proceed_at: Option<Instant>,
    note: String,
}

impl SessionSelection {
    pub fn new(server: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            tenant: tenant.into(),
            username: TextInput::new(),
            password: TextInput::new(),
            focus: Focus::Username,
            existing: None,
            proceed_at: None,
            note: String::new(),
        }
    }

    fn proceed(&self, username: &str, ctx: &mut Context) -> Vec<Action> {
        ctx.sign_in(&self.tenant, username);
        vec![Action::ResetTo(Box::new(Overseer::new()))]
    }

    fn no_session(&mut self) -> Vec<Action> {
        self.existing = None;
        self.proceed_at = None;
        self.note = "⚠ No existing session - authentication required".to_string();
        self.focus = Focus::Username;
        vec![Action::info("Enter username and password to authenticate")]
    }

    fn authenticate(&mut self) -> Vec<Action> {
        if self.username.is_empty() {
            self.focus = Focus::Username;
            return vec![Action::warning("Username required")];
        }
        if self.password.is_empty() {
            self.focus = Focus::Password;
            return vec![Action::warning("Password required")];
        }
        self.proceed_at = None;
        vec![
            Action::info("Authenticating..."),
            Action::Execute(MonkCommand::AuthLogin {
                tenant: self.tenant.clone(),
                username: self.username.value().to_string(),
                password: self.password.value().to_string(),
            }),
        ]
    }

    fn use_existing(&mut self, ctx: &mut Context) -> Vec<Action> {
        match self.existing.clone() {
            Some(user) => self.proceed(&user, ctx),
            None => vec![Action::warning("No existing session available")],
        }
    }

    fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Username => Focus::Password,
            Focus::Password => Focus::Actions,
            Focus::Actions => Focus::Username,
        };
    }
}

impl Screen for SessionSelection {
    fn id(&self) -> ScreenId {
        ScreenId::SessionSelection
    }

    fn title(&self) -> String {
        "VAULT ACCESS AUTHENTICATION".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new(keys::ENTER, "authenticate", "Authenticate"),
            Binding::new(keys::SAVE, "use_existing", "Use Existing"),
            Binding::new("tab", "next_field", "Next Field"),
            Binding::new(keys::BACK, "back", "Back to Tenants"),
        ]
    }

    fn captures_text(&self) -> bool {
        self.focus != Focus::Actions
    }

    fn on_enter(&mut self, ctx: &mut Context) -> Vec<Action> {
        self.username.set(ctx.default_username.clone());
        vec![
            Action::info("Checking for existing authentication..."),
            Action::Execute(MonkCommand::AuthStatus),
        ]
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => return vec![Action::Pop],
            KeyCode::Enter => return self.authenticate(),
            KeyCode::Tab | KeyCode::Down => {
                self.next_focus();
                return Vec::new();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.next_focus();
                self.next_focus();
                return Vec::new();
            }
            _ => {}
        }
        match self.focus {
            Focus::Username => {
                self.username.handle_key(key);
                Vec::new()
            }
            Focus::Password => {
                self.password.handle_key(key);
                Vec::new()
            }
            Focus::Actions => match key.code {
                KeyCode::Char('s') => self.use_existing(ctx),
                _ => Vec::new(),
            },
        }
    }

    fn on_result(
        &mut self,
        command: &MonkCommand,
        result: &CommandResult,
        ctx: &mut Context,
    ) -> Vec<Action> {
        match command {
            MonkCommand::AuthStatus => {
                let authenticated = result.succeeded
                    && result
                        .value()
                        .and_then(|v| v.get("authenticated"))
                        .and_then(|v| v.as_bool())
                        .unwrap_or(false);
                if authenticated {
                    vec![Action::Execute(MonkCommand::AuthExpired)]
                } else {
                    self.no_session()
                }
            }
            MonkCommand::AuthExpired => {
                if session_still_valid(result) {
                    vec![Action::Execute(MonkCommand::AuthInfo)]
                } else {
                    self.no_session()
                }
            }
            MonkCommand::AuthInfo => {
                let Some(info) = result.value().filter(|_| result.succeeded) else {
                    return self.no_session();
                };
                let current_tenant = str_field(info, "tenant", "");
                if current_tenant != self.tenant {
                    return self.no_session();
                }
                let user = str_field(info, "name", "unknown").to_string();
                self.note = format!("Current session: {user}@{current_tenant}");
                self.existing = Some(user);
                self.focus = Focus::Actions;
                self.proceed_at = Some(Instant::now() + AUTO_PROCEED_DELAY);
                vec![Action::success("Using existing authenticated session...")]
            }
            MonkCommand::AuthLogin { username, .. } => {
                if result.succeeded {
                    self.proceed(username, ctx)
                } else {
                    self.focus = Focus::Password;
                    vec![Action::error(format!(
                        "Authentication failed: {}",
                        result.error_or("Authentication failed")
                    ))]
                }
            }
            _ => Vec::new(),
        }
    }

    fn on_tick(&mut self, now: Instant, ctx: &mut Context) -> Vec<Action> {
        match self.proceed_at {
            Some(at) if now >= at => {
                self.proceed_at = None;
                self.use_existing(ctx)
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            heading("STEP 3 of 3: Vault Access Authentication"),
            plain("\"Security clearance protocols ensure only authorized personnel access vault facilities.\""),
            plain(""),
            plain(format!("Server: {}", self.server)),
            plain(format!("Tenant: {}", self.tenant)),
            Line::from(Span::styled(self.note.clone(), theme::title())),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let [user_area, pass_area, hint_area, _] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(body);

        frame.render_widget(
            InputField::new("USERNAME", &self.username, self.focus == Focus::Username),
            user_area,
        );
        frame.render_widget(
            InputField::new("PASSWORD", &self.password, self.focus == Focus::Password).masked(),
            pass_area,
        );
        if self.existing.is_some() {
            let hint = Line::from(vec![
                Span::styled("[S]", theme::key()),
                Span::styled(" USE EXISTING SESSION", theme::text()),
            ]);
            frame.render_widget(Paragraph::new(hint), hint_area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ok(stdout: &str) -> CommandResult {
        CommandResult::from_process(0, stdout, "")
    }

    fn executes(actions: &[Action], expected: &MonkCommand) -> bool {
        actions
            .iter()
            .any(|a| matches!(a, Action::Execute(c) if c == expected))
    }

    fn screen() -> (SessionSelection, Context) {
        let mut ctx = Context::new("root");
        let mut screen = SessionSelection::new("local", "vault-101");
        let actions = screen.on_enter(&mut ctx);
        assert!(executes(&actions, &MonkCommand::AuthStatus));
        (screen, ctx)
    }

    #[test]
    fn test_existing_session_chain() {
        let (mut screen, mut ctx) = screen();
        let actions = screen.on_result(&MonkCommand::AuthStatus, &ok(r#"{"authenticated":true}"#), &mut ctx);
        assert!(executes(&actions, &MonkCommand::AuthExpired));

        let actions = screen.on_result(&MonkCommand::AuthExpired, &ok(""), &mut ctx);
        assert!(executes(&actions, &MonkCommand::AuthInfo));

        screen.on_result(
            &MonkCommand::AuthInfo,
            &ok(r#"{"name":"overseer","tenant":"vault-101"}"#),
            &mut ctx,
        );
        assert_eq!(screen.existing.as_deref(), Some("overseer"));
        assert!(!screen.captures_text());

        let actions = screen.handle_key(press(KeyCode::Char('s')), &mut ctx);
        assert!(matches!(actions.as_slice(), [Action::ResetTo(s)] if s.id() == ScreenId::Overseer));
        assert_eq!(ctx.identity(), "overseer@vault-101");
        assert!(ctx.authenticated);
    }

    #[test]
    fn test_auto_proceed_after_delay() {
        let (mut screen, mut ctx) = screen();
        screen.on_result(
            &MonkCommand::AuthInfo,
            &ok(r#"{"name":"overseer","tenant":"vault-101"}"#),
            &mut ctx,
        );
        assert!(screen.on_tick(Instant::now(), &mut ctx).is_empty());
        let later = Instant::now() + AUTO_PROCEED_DELAY + Duration::from_millis(10);
        let actions = screen.on_tick(later, &mut ctx);
        assert!(matches!(actions.as_slice(), [Action::ResetTo(_)]));
        assert!(screen.on_tick(later, &mut ctx).is_empty());
    }

    #[test]
    fn test_expired_session_requires_login() {
        let (mut screen, mut ctx) = screen();
        let actions = screen.on_result(
            &MonkCommand::AuthExpired,
            &CommandResult::from_process(1, "", ""),
            &mut ctx,
        );
        assert!(!executes(&actions, &MonkCommand::AuthInfo));
        assert!(screen.existing.is_none());
        assert!(screen.captures_text());
    }

    #[test]
    fn test_other_tenant_session_not_offered() {
        let (mut screen, mut ctx) = screen();
        screen.on_result(
            &MonkCommand::AuthInfo,
            &ok(r#"{"name":"overseer","tenant":"vault-111"}"#),
            &mut ctx,
        );
        assert!(screen.existing.is_none());
        let actions = screen.use_existing(&mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m == "No existing session available"));
    }

    #[test]
    fn test_login_form() {
        let (mut screen, mut ctx) = screen();
        assert_eq!(screen.username.text(), "root");

        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m == "Password required"));
        assert_eq!(screen.focus, Focus::Password);

        for c in "hunter2".chars() {
            screen.handle_key(press(KeyCode::Char(c)), &mut ctx);
        }
        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        let login = MonkCommand::AuthLogin {
            tenant: "vault-101".into(),
            username: "root".into(),
            password: "hunter2".into(),
        };
        assert!(executes(&actions, &login));

        let actions = screen.on_result(&login, &ok(""), &mut ctx);
        assert!(matches!(actions.as_slice(), [Action::ResetTo(_)]));
        assert_eq!(ctx.identity(), "root@vault-101");
    }

    #[test]
    fn test_login_failure_message() {
        let (mut screen, mut ctx) = screen();
        let login = MonkCommand::AuthLogin {
            tenant: "vault-101".into(),
            username: "root".into(),
            password: "bad".into(),
        };
        let actions = screen.on_result(&login, &CommandResult::from_process(1, "", ""), &mut ctx);
        assert!(
            matches!(&actions[..], [Action::Status(_, m)] if m == "Authentication failed: Authentication failed")
        );
        let actions = screen.on_result(
            &login,
            &CommandResult::from_process(1, "", "invalid credentials"),
            &mut ctx,
        );
        assert!(
            matches!(&actions[..], [Action::Status(_, m)] if m == "Authentication failed: invalid credentials")
        );
        assert!(!ctx.authenticated);
    }
}
