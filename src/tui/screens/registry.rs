use super::tenant_selection::{parse_tenants, TenantEntry};
use super::{array_field, bool_field, move_cursor, plain, render_frame, str_field, NewServer};
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::confirm::{render_confirm_dialog, Severity};
use crate::tui::widgets::input::{InputField, TextInput};
use crate::tui::widgets::table::{Cell, KillboxTable};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    Frame,
};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Servers,
    Tenants,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerRow {
    name: String,
    url: String,
    status: String,
    description: String,
}

impl ServerRow {
    fn demo(name: &str, url: &str, status: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            status: status.to_string(),
            description: description.to_string(),
        }
    }

    fn online(&self) -> bool {
        self.status.contains("ONLINE")
    }
}

fn parse_server_rows(value: Option<&Value>) -> Vec<ServerRow> {
    array_field(value, "servers")
        .iter()
        .map(|server| {
            let mut status = match str_field(server, "status", "unknown") {
                "up" => "●ONLINE",
                "down" => "◐OFFLINE",
                _ => "⚠UNKNOWN",
            }
            .to_string();
            if bool_field(server, "is_current") {
                status.push_str(" *");
            }
            ServerRow {
                name: str_field(server, "name", "unknown").to_string(),
                url: str_field(server, "endpoint", "unknown").to_string(),
                status,
                description: str_field(server, "description", "").to_string(),
            }
        })
        .collect()
}

/// Rows shown when `server list` is unavailable.
fn demo_servers() -> Vec<ServerRow> {
    vec![
        ServerRow::demo("local", "http://localhost:9001", "●ONLINE", "Development server"),
        ServerRow::demo("staging", "https://staging.example.com", "⚠TIMEOUT", "Staging environment"),
        ServerRow::demo("prod", "https://api.example.com", "◐OFFLINE", "Production server"),
    ]
}

/// Department registry: manage servers and tenants after login.
#[derive(Debug)]
pub struct Registry {
    view: View,
    servers: Vec<ServerRow>,
    tenants: Vec<TenantEntry>,
    cursor: usize,
    create_prompt: Option<TextInput>,
    /// Name awaiting delete confirmation, with the view it belongs to.
    pending_delete: Option<(View, String)>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            view: View::Servers,
            servers: Vec::new(),
            tenants: Vec::new(),
            cursor: 0,
            create_prompt: None,
            pending_delete: None,
        }
    }

    fn load(&self) -> Vec<Action> {
        match self.view {
            View::Servers => vec![
                Action::info("Loading server registry..."),
                Action::Execute(MonkCommand::ServerList),
            ],
            View::Tenants => vec![
                Action::info("Loading tenant databases..."),
                Action::Execute(MonkCommand::TenantList),
            ],
        }
    }

    fn switch_view(&mut self, view: View) -> Vec<Action> {
        if self.view == view {
            return Vec::new();
        }
        self.view = view;
        self.cursor = 0;
        self.load()
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::Servers => self.servers.len(),
            View::Tenants => self.tenants.len(),
        }
    }

    fn selected_name(&self) -> Option<String> {
        match self.view {
            View::Servers => self.servers.get(self.cursor).map(|s| s.name.clone()),
            View::Tenants => self.tenants.get(self.cursor).map(|t| t.name.clone()),
        }
    }

    fn stats(&self) -> String {
        let online = self.servers.iter().filter(|s| s.online()).count();
        let authenticated = self.tenants.iter().filter(|t| t.authenticated).count();
        format!(
            "Connected Vaults: {online}/{} | Authenticated Tenants: {authenticated}/{}",
            self.servers.len(),
            self.tenants.len()
        )
    }

    fn use_selected(&mut self) -> Vec<Action> {
        let Some(name) = self.selected_name() else {
            return vec![Action::warning("Nothing selected")];
        };
        match self.view {
            View::Servers => vec![
                Action::info(format!("Switching to server: {name}")),
                Action::Execute(MonkCommand::ServerUse(name)),
            ],
            View::Tenants => vec![
                Action::info(format!("Switching to tenant: {name}")),
                Action::Execute(MonkCommand::TenantUse(name)),
            ],
        }
    }

    fn ping_selected(&self) -> Vec<Action> {
        if self.view == View::Tenants {
            return vec![Action::warning("Ping not available for tenants")];
        }
        match self.selected_name() {
            Some(name) => vec![
                Action::info(format!("Pinging {name}...")),
                Action::Execute(MonkCommand::ServerPing(Some(name))),
            ],
            None => vec![Action::warning("Please select a server first")],
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                let Some((view, name)) = self.pending_delete.take() else {
                    return Vec::new();
                };
                let command = match view {
                    View::Servers => MonkCommand::ServerDelete(name.clone()),
                    View::Tenants => MonkCommand::TenantDelete(name.clone()),
                };
                vec![Action::info(format!("Deleting {name}...")), Action::Execute(command)]
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                vec![Action::info("Deletion cancelled")]
            }
            _ => Vec::new(),
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Vec<Action> {
        let Some(prompt) = self.create_prompt.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => {
                self.create_prompt = None;
                vec![Action::info("Tenant creation cancelled")]
            }
            KeyCode::Enter => {
                if prompt.is_empty() {
                    return vec![Action::warning("Tenant name required")];
                }
                let name = prompt.value().to_string();
                self.create_prompt = None;
                vec![
                    Action::info(format!("Creating tenant: {name}")),
                    Action::Execute(MonkCommand::TenantCreate(name)),
                ]
            }
            _ => {
                prompt.handle_key(key);
                Vec::new()
            }
        }
    }

    /// Outcome of a mutating command: a status plus a reload of the current view.
    fn after_change(&self, result: &CommandResult, done: String, failed: &str) -> Vec<Action> {
        if result.succeeded {
            let mut actions = self.load();
            actions.push(Action::success(done));
            actions
        } else {
            vec![Action::error(failure_text(failed, result, "monk CLI unavailable"))]
        }
    }
}

impl Screen for Registry {
    fn id(&self) -> ScreenId {
        ScreenId::Registry
    }

    fn title(&self) -> String {
        match self.view {
            View::Servers => "SERVER REGISTRY".to_string(),
            View::Tenants => "TENANT DATABASE REGISTRY".to_string(),
        }
    }

    fn bindings(&self) -> Vec<Binding> {
        if self.pending_delete.is_some() {
            return vec![
                Binding::new("y", "confirm_delete", "Delete"),
                Binding::new("n", "cancel_delete", "Keep"),
            ];
        }
        if self.create_prompt.is_some() {
            return vec![
                Binding::new(keys::ENTER, "create_tenant", "Create"),
                Binding::new(keys::CANCEL, "cancel", "Cancel"),
            ];
        }
        let mut bindings = keys::crud_bindings(true, true, true, true);
        bindings.extend([
            Binding::new("s", "toggle_servers", "Servers"),
            Binding::new("t", "toggle_tenants", "Tenants"),
            Binding::new("p", "ping_item", "Ping"),
            Binding::new(keys::REFRESH, "refresh", "Refresh"),
            Binding::new(keys::BACK, "back", "Back"),
        ]);
        bindings
    }

    fn domain(&self) -> Option<Domain> {
        match self.view {
            View::Servers => Some(Domain::Server),
            View::Tenants => Some(Domain::Tenant),
        }
    }

    fn captures_text(&self) -> bool {
        self.create_prompt.is_some()
    }

    fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
        self.load()
    }

    fn on_resume(&mut self, _ctx: &mut Context) -> Vec<Action> {
        self.load()
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        if self.pending_delete.is_some() {
            return self.handle_confirm_key(key);
        }
        if self.create_prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        let rows = self.row_count();
        if move_cursor(&mut self.cursor, rows, &key) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('s') => self.switch_view(View::Servers),
            KeyCode::Char('t') => self.switch_view(View::Tenants),
            KeyCode::Char('f') | KeyCode::Char('r') => self.load(),
            KeyCode::Char('u') | KeyCode::Enter => self.use_selected(),
            KeyCode::Char('p') => self.ping_selected(),
            KeyCode::Char('c') => match self.view {
                View::Servers => vec![Action::Push(Box::new(NewServer::new()))],
                View::Tenants => {
                    self.create_prompt = Some(TextInput::new());
                    vec![Action::info("Enter a name for the new tenant database")]
                }
            },
            KeyCode::Char('d') => match self.selected_name() {
                Some(name) => {
                    self.pending_delete = Some((self.view, name));
                    Vec::new()
                }
                None => vec![Action::warning("Nothing selected")],
            },
            KeyCode::Esc => vec![Action::Pop],
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
            MonkCommand::ServerList => {
                self.cursor = 0;
                if result.succeeded && result.object().is_some() {
                    self.servers = parse_server_rows(result.value());
                    vec![Action::Execute(MonkCommand::ServerCurrent)]
                } else {
                    self.servers = demo_servers();
                    vec![Action::warning("Using demo data - monk CLI not available")]
                }
            }
            MonkCommand::ServerCurrent => {
                let current = result
                    .text()
                    .filter(|_| result.succeeded)
                    .unwrap_or("None");
                vec![Action::info(format!(
                    "Loaded {} servers. Current: {current}",
                    self.servers.len()
                ))]
            }
            MonkCommand::TenantList => {
                self.cursor = 0;
                if result.succeeded && result.object().is_some() {
                    self.tenants = parse_tenants(result.value());
                    vec![Action::info(format!(
                        "Loaded {} tenant databases",
                        self.tenants.len()
                    ))]
                } else {
                    self.tenants.clear();
                    vec![Action::error(failure_text(
                        "Failed to load tenants",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            MonkCommand::ServerUse(name) => {
                if result.succeeded {
                    ctx.server = Some(name.clone());
                    vec![Action::success(format!("Now using server: {name}"))]
                } else {
                    vec![Action::error(failure_text(
                        "Failed to switch server",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            MonkCommand::TenantUse(name) => {
                if result.succeeded {
                    ctx.tenant = Some(name.clone());
                    vec![Action::success(format!("Now using tenant: {name}"))]
                } else {
                    vec![Action::error(failure_text(
                        "Failed to switch tenant",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            MonkCommand::ServerPing(Some(name)) => {
                if result.succeeded {
                    vec![Action::success(format!("Ping successful: {name}"))]
                } else {
                    vec![Action::error(failure_text("Ping failed", result, "no response"))]
                }
            }
            MonkCommand::ServerDelete(name) => {
                self.after_change(result, format!("Server deleted: {name}"), "Failed to delete server")
            }
            MonkCommand::TenantDelete(name) => {
                self.after_change(result, format!("Tenant deleted: {name}"), "Failed to delete tenant")
            }
            MonkCommand::TenantCreate(name) => {
                self.after_change(result, format!("Tenant created: {name}"), "Failed to create tenant")
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let tab = |label: &'static str, view: View| {
            if self.view == view {
                Span::styled(label, theme::selected())
            } else {
                Span::styled(label, theme::dim())
            }
        };
        let intro = vec![
            Line::from(vec![
                tab(" [S] SERVERS ", View::Servers),
                Span::raw("  "),
                tab(" [T] TENANTS ", View::Tenants),
            ]),
            plain(self.stats()),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let [table_area, prompt_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(body);

        let (headers, rows): (&[&str], Vec<Vec<Cell>>) = match self.view {
            View::Servers => (
                &["NAME", "URL", "STATUS", "DESCRIPTION"][..],
                self.servers
                    .iter()
                    .map(|s| {
                        let style = if s.online() { theme::text() } else { theme::dim() };
                        vec![
                            Cell::from(s.name.clone()),
                            Cell::from(s.url.clone()),
                            Cell::styled(s.status.clone(), style),
                            Cell::from(s.description.clone()),
                        ]
                    })
                    .collect(),
            ),
            View::Tenants => (
                &["NAME", "DISPLAY NAME", "AUTH", "CURRENT"][..],
                self.tenants
                    .iter()
                    .map(|t| {
                        vec![
                            Cell::from(t.name.clone()),
                            Cell::from(t.display_name.clone()),
                            Cell::from(if t.authenticated { "AUTH" } else { "NO_AUTH" }),
                            Cell::from(if t.is_current { "*" } else { "" }),
                        ]
                    })
                    .collect(),
            ),
        };
        let table = KillboxTable::new(headers, &rows)
            .selected(self.selected())
            .empty_text("Registry empty.");
        frame.render_widget(table, table_area);

        if let Some(prompt) = &self.create_prompt {
            frame.render_widget(InputField::new("NEW TENANT", prompt, true), prompt_area);
        }
        if let Some((view, name)) = &self.pending_delete {
            let kind = match view {
                View::Servers => "server",
                View::Tenants => "tenant",
            };
            render_confirm_dialog(
                frame,
                area,
                "CONFIRM DELETION",
                &format!("Permanently delete {kind} '{name}'?"),
                Severity::Destructive,
            );
        }
    }

    fn selected(&self) -> Option<usize> {
        (self.row_count() > 0).then_some(self.cursor)
    }
}
