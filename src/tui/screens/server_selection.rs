use super::{array_field, bool_field, digit_index, heading, move_cursor, plain, render_frame, str_field};
use super::{NewServer, QuitConfirmation, TenantSelection};
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::widgets::table::{Cell, KillboxTable};
use crate::tui::theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use serde_json::Value;

/// Most servers offered for selection.
const MAX_SERVERS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerEntry {
    pub name: String,
    pub endpoint: String,
    pub online: bool,
    pub auth_sessions: u64,
    pub is_current: bool,
}

impl ServerEntry {
    fn status_label(&self) -> &'static str {
        if self.online {
            "●ONLINE"
        } else {
            "◐OFFLINE"
        }
    }
}

/// Reads `{"servers": [...]}` from `server list --json`.
pub(crate) fn parse_servers(value: Option<&Value>) -> Vec<ServerEntry> {
    array_field(value, "servers")
        .iter()
        .map(|server| ServerEntry {
            name: str_field(server, "name", "unknown").to_string(),
            endpoint: str_field(server, "endpoint", "unknown").to_string(),
            online: str_field(server, "status", "") == "up",
            auth_sessions: server
                .get("auth_sessions")
                .and_then(Value::as_u64)
                .unwrap_or(0),
            is_current: bool_field(server, "is_current"),
        })
        .collect()
}

/// Step 1 of 3: choose a vault facility server.
#[derive(Debug, Default)]
pub struct ServerSelection {
    servers: Vec<ServerEntry>,
    cursor: usize,
}

impl ServerSelection {
    pub fn new() -> Self {
        Self::default()
    }

    fn load() -> Vec<Action> {
        vec![
            Action::info("Loading vault facility servers..."),
            Action::Execute(MonkCommand::ServerList),
        ]
    }

    fn select(&mut self, index: usize) -> Vec<Action> {
        let Some(server) = self.servers.get(index) else {
            return vec![Action::warning("Invalid server selection")];
        };
        self.cursor = index;
        vec![
            Action::info(format!("Switching to server: {}", server.name)),
            Action::Execute(MonkCommand::ServerUse(server.name.clone())),
        ]
    }
}

impl Screen for ServerSelection {
    fn id(&self) -> ScreenId {
        ScreenId::ServerSelection
    }

    fn title(&self) -> String {
        "VAULT-TEC FACILITY SELECTION".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new("1-9", "select_server", "Select"),
            Binding::new(keys::ENTER, "select_server", "Connect"),
            Binding::new("p", "ping_server", "Ping"),
            Binding::new(keys::CREATE, "create_server", "New Server"),
            Binding::new(keys::REFRESH, "refresh", "Refresh"),
            Binding::new(keys::BACK, "quit_app", "Quit"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Server)
    }

    fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
        Self::load()
    }

    fn on_resume(&mut self, _ctx: &mut Context) -> Vec<Action> {
        Self::load()
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        if let Some(index) = digit_index(&key) {
            return self.select(index);
        }
        if move_cursor(&mut self.cursor, self.servers.len(), &key) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Enter => self.select(self.cursor),
            KeyCode::Char('p') => match self.servers.get(self.cursor) {
                Some(server) => vec![
                    Action::info(format!("Pinging {}...", server.name)),
                    Action::Execute(MonkCommand::ServerPing(Some(server.name.clone()))),
                ],
                None => vec![Action::warning("Please select a server first")],
            },
            KeyCode::Char('c') => vec![Action::Push(Box::new(NewServer::new()))],
            KeyCode::Char('r') | KeyCode::Char('f') => Self::load(),
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
            MonkCommand::ServerList => {
                if !result.succeeded || result.object().is_none() {
                    self.servers.clear();
                    self.cursor = 0;
                    return vec![Action::error(format!(
                        "⚠ Overseer resource list not found! {}. Use [c] CREATE SERVER to configure connections.",
                        result.error_or("monk CLI unavailable")
                    ))];
                }
                self.servers = parse_servers(result.value());
                self.servers.truncate(MAX_SERVERS);
                self.cursor = self
                    .servers
                    .iter()
                    .position(|s| s.is_current)
                    .unwrap_or(0);
                if self.servers.is_empty() {
                    vec![Action::warning(
                        "No servers configured. Use [c] CREATE SERVER to add one.",
                    )]
                } else {
                    vec![Action::info(format!(
                        "Found {} vault facility servers. Use [ENTER] to select.",
                        self.servers.len()
                    ))]
                }
            }
            MonkCommand::ServerUse(name) => {
                if result.succeeded {
                    ctx.server = Some(name.clone());
                    vec![Action::Push(Box::new(TenantSelection::new(name)))]
                } else {
                    vec![Action::error(failure_text(
                        "Failed to switch server",
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
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            heading("STEP 1 of 3: Choose Vault Facility Server"),
            plain("\"Vault-Tec: Preparing for the Future!\""),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let rows: Vec<Vec<Cell>> = self
            .servers
            .iter()
            .map(|s| {
                let status_style = if s.online {
                    theme::health(crate::mock::Health::Ok)
                } else {
                    theme::dim()
                };
                vec![
                    Cell::from(s.name.clone()),
                    Cell::from(s.endpoint.clone()),
                    Cell::styled(s.status_label(), status_style),
                    Cell::from(format!(
                        "{} sessions{}",
                        s.auth_sessions,
                        if s.is_current { " *" } else { "" }
                    )),
                ]
            })
            .collect();
        let table = KillboxTable::new(&["NAME", "ENDPOINT", "STATUS", "SESSIONS"], &rows)
            .selected((!rows.is_empty()).then_some(self.cursor))
            .empty_text("No servers configured.");
        frame.render_widget(table, body);
    }

    fn selected(&self) -> Option<usize> {
        (!self.servers.is_empty()).then_some(self.cursor)
    }
}
