use super::{heading, plain, render_frame, str_field};
use super::{Population, QuitConfirmation, Registry, SchemaLab, ServerSelection};
use crate::keys::{self, Binding};
use crate::mock::{DashboardData, VaultDataGenerator};
use crate::monk::{CommandResult, MonkCommand};
use crate::session::session_display;
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::panels::{ActivityLog, AlertPanel, PopulationPanel, SystemStatusPanel};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::{Duration, Instant};

pub const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(10);
pub const DASHBOARD_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const ACTIVITY_LIMIT: usize = 20;

const MODULES: [(&str, &str); 4] = [
    ("1", "DEPT REGISTRY"),
    ("2", "SCHEMA LAB"),
    ("3", "POPULATION"),
    ("L", "LOGOUT"),
];

/// The main console: who is signed in, how long the token lasts, and the
/// vault dashboards.
#[derive(Debug)]
pub struct Overseer {
    generator: VaultDataGenerator,
    data: DashboardData,
    /// Last `auth expires` output.
    expires: Option<String>,
    last_session_check: Instant,
    last_refresh: Instant,
}

impl Default for Overseer {
    fn default() -> Self {
        Self::new()
    }
}

impl Overseer {
    pub fn new() -> Self {
        Self::with_generator(VaultDataGenerator::new())
    }

    pub fn with_generator(mut generator: VaultDataGenerator) -> Self {
        let data = generator.dashboard(Local::now().naive_local(), "overseer");
        let now = Instant::now();
        Self {
            generator,
            data,
            expires: None,
            last_session_check: now,
            last_refresh: now,
        }
    }

    fn refresh(&mut self, ctx: &Context) {
        let user = ctx.username.as_deref().unwrap_or("overseer");
        let fresh = self.generator.dashboard(Local::now().naive_local(), user);
        self.data.system_status = fresh.system_status;
        self.data.population = fresh.population;
        self.data.alerts = fresh.alerts;
        if let Some(entry) = self.generator.occasional_activity(user) {
            self.data.recent_activity.insert(0, entry);
            self.data.recent_activity.truncate(ACTIVITY_LIMIT);
        }
    }

    fn session_line(&self) -> String {
        match &self.expires {
            Some(text) => session_display(text, Local::now().naive_local()),
            None => "Session: Loading...".to_string(),
        }
    }
}

impl Screen for Overseer {
    fn id(&self) -> ScreenId {
        ScreenId::Overseer
    }

    fn title(&self) -> String {
        "OVERSEER CONSOLE".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new("1", "module_1", "Dept Registry"),
            Binding::new("2", "module_2", "Schema Lab"),
            Binding::new("3", "module_3", "Population"),
            Binding::new(keys::REFRESH, "refresh", "Refresh"),
            Binding::new("l", "logout", "Logout"),
            Binding::new(keys::BACK, "quit_app", "Quit"),
        ]
    }

    fn on_enter(&mut self, ctx: &mut Context) -> Vec<Action> {
        let user = ctx.username.as_deref().unwrap_or("overseer");
        self.data = self.generator.dashboard(Local::now().naive_local(), user);
        vec![Action::Execute(MonkCommand::AuthInfo)]
    }

    fn handle_key(&mut self, key: KeyEvent, ctx: &mut Context) -> Vec<Action> {
        match key.code {
            KeyCode::Char('1') => vec![Action::Push(Box::new(Registry::new()))],
            KeyCode::Char('2') => vec![Action::Push(Box::new(SchemaLab::new()))],
            KeyCode::Char('3') => vec![Action::Push(Box::new(Population::new()))],
            KeyCode::Char('r') => {
                self.refresh(ctx);
                self.last_refresh = Instant::now();
                vec![Action::info("Dashboard refreshed")]
            }
            KeyCode::Char('l') => vec![
                Action::info("Logging out..."),
                Action::Execute(MonkCommand::AuthLogout),
            ],
            KeyCode::Esc => vec![Action::Push(Box::new(QuitConfirmation::new()))],
            _ => Vec::new(),
        }
    }

    fn on_result(
        &mut self,
        command: &MonkCommand,
        result: &CommandResult,
        ctx: &mut Context,
    ) -> Vec<Action> {
        match command {
            MonkCommand::AuthInfo => {
                let Some(info) = result.value().filter(|_| result.succeeded) else {
                    return Vec::new();
                };
                let tenant = str_field(info, "tenant", ctx.tenant.as_deref().unwrap_or("no-tenant"))
                    .to_string();
                let user = str_field(info, "name", ctx.username.as_deref().unwrap_or("unknown"))
                    .to_string();
                ctx.sign_in(&tenant, &user);
                vec![Action::Execute(MonkCommand::AuthExpires)]
            }
            MonkCommand::AuthExpires => {
                if result.succeeded && !result.raw_output.is_empty() {
                    self.expires = Some(result.raw_output.clone());
                }
                Vec::new()
            }
            MonkCommand::AuthLogout => {
                ctx.sign_out();
                let status = if result.succeeded {
                    Action::success("Logged out")
                } else {
                    Action::warning(failure_text("Logout incomplete", result, "monk CLI unavailable"))
                };
                vec![Action::ResetTo(Box::new(ServerSelection::new())), status]
            }
            _ => Vec::new(),
        }
    }

    fn on_tick(&mut self, now: Instant, ctx: &mut Context) -> Vec<Action> {
        if now.saturating_duration_since(self.last_refresh) >= DASHBOARD_REFRESH_INTERVAL {
            self.last_refresh = now;
            self.refresh(ctx);
        }
        if now.saturating_duration_since(self.last_session_check) >= SESSION_CHECK_INTERVAL {
            self.last_session_check = now;
            return vec![Action::Execute(MonkCommand::AuthExpires)];
        }
        Vec::new()
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let intro = vec![
            heading(format!("▼ OVERSEER: {} ▼", ctx.identity())),
            plain(self.session_line()),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let [panels, activity, nav] = Layout::vertical([
            Constraint::Length(7),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(body);

        let [status_area, population_area, alert_area] =
            Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(panels);
        frame.render_widget(SystemStatusPanel::new(&self.data.system_status), status_area);
        frame.render_widget(PopulationPanel::new(&self.data.population), population_area);
        frame.render_widget(AlertPanel::new(&self.data.alerts), alert_area);
        frame.render_widget(ActivityLog::new(&self.data.recent_activity), activity);

        let spans: Vec<Span> = MODULES
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(format!("[{key}]"), theme::key()),
                    Span::styled(format!(" {label}  "), theme::text()),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(spans)), nav);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen() -> Overseer {
        let now = NaiveDate::from_ymd_opt(2077, 10, 23)
            .unwrap()
            .and_hms_opt(9, 47, 0)
            .unwrap();
        Overseer::with_generator(VaultDataGenerator::seeded(101, now))
    }

    #[test]
    fn test_module_navigation() {
        let mut screen = screen();
        let mut ctx = Context::default();
        let cases = [
            ('1', ScreenId::Registry),
            ('2', ScreenId::SchemaLab),
            ('3', ScreenId::Population),
        ];
        for (key, id) in cases {
            let actions = screen.handle_key(press(KeyCode::Char(key)), &mut ctx);
            assert!(matches!(actions.as_slice(), [Action::Push(s)] if s.id() == id));
        }
    }

    #[test]
    fn test_auth_info_updates_identity_then_checks_expiry() {
        let mut screen = screen();
        let mut ctx = Context::default();
        ctx.sign_in("test-1756112139", "root");
        let actions = screen.on_result(
            &MonkCommand::AuthInfo,
            &CommandResult::from_process(0, r#"{"name":"overseer","tenant":"vault-101"}"#, ""),
            &mut ctx,
        );
        assert_eq!(ctx.identity(), "overseer@vault-101");
        assert!(matches!(actions.as_slice(), [Action::Execute(MonkCommand::AuthExpires)]));
    }

    #[test]
    fn test_failed_auth_info_keeps_context() {
        let mut screen = screen();
        let mut ctx = Context::default();
        ctx.sign_in("test-1756112139", "root");
        let actions = screen.on_result(
            &MonkCommand::AuthInfo,
            &CommandResult::from_process(1, "", "not logged in"),
            &mut ctx,
        );
        assert!(actions.is_empty());
        assert_eq!(ctx.identity(), "root@test-1756112139");
    }

    #[test]
    fn test_session_line() {
        let mut screen = screen();
        assert_eq!(screen.session_line(), "Session: Loading...");
        screen.on_result(
            &MonkCommand::AuthExpires,
            &CommandResult::from_process(0, "Thu Jan 18 20:30:22 EST 2018\n", ""),
            &mut Context::default(),
        );
        assert!(screen.session_line().starts_with("Session: EXPIRED"));
    }

    #[test]
    fn test_session_check_interval() {
        let mut screen = screen();
        let mut ctx = Context::default();
        let start = screen.last_session_check;
        assert!(screen.on_tick(start, &mut ctx).is_empty());
        let actions = screen.on_tick(start + SESSION_CHECK_INTERVAL, &mut ctx);
        assert!(matches!(actions.as_slice(), [Action::Execute(MonkCommand::AuthExpires)]));
        assert!(screen
            .on_tick(start + SESSION_CHECK_INTERVAL + Duration::from_secs(1), &mut ctx)
            .is_empty());
    }

    #[test]
    fn test_refresh_keeps_activity_bounded() {
        let mut screen = screen();
        let ctx = Context::default();
        for _ in 0..100 {
            screen.refresh(&ctx);
        }
        assert!(screen.data.recent_activity.len() <= ACTIVITY_LIMIT);
        assert!(screen.data.recent_activity.len() >= 10);
    }

    #[test]
    fn test_logout_returns_to_servers() {
        let mut screen = screen();
        let mut ctx = Context::default();
        ctx.server = Some("local".into());
        ctx.sign_in("vault-101", "overseer");

        let actions = screen.handle_key(press(KeyCode::Char('l')), &mut ctx);
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::Execute(MonkCommand::AuthLogout))));

        let actions = screen.on_result(
            &MonkCommand::AuthLogout,
            &CommandResult::from_process(0, "", ""),
            &mut ctx,
        );
        assert!(matches!(actions.first(), Some(Action::ResetTo(s)) if s.id() == ScreenId::ServerSelection));
        assert!(!ctx.authenticated);
        assert_eq!(ctx.server.as_deref(), Some("local"));
    }
}
