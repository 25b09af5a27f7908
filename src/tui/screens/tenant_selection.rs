use super::{array_field, bool_field, digit_index, heading, move_cursor, plain, render_frame, str_field};
use super::SessionSelection;
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::input::{InputField, TextInput};
use crate::tui::widgets::table::{Cell, KillboxTable};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};
use serde_json::Value;

const MAX_TENANTS: usize = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TenantEntry {
    pub name: String,
    pub display_name: String,
    pub authenticated: bool,
    pub is_current: bool,
}

/// Reads `{"tenants": [...]}` from `tenant list --json`.
pub(crate) fn parse_tenants(value: Option<&Value>) -> Vec<TenantEntry> {
    array_field(value, "tenants")
        .iter()
        .map(|tenant| {
            let name = str_field(tenant, "name", "unknown");
            TenantEntry {
                name: name.to_string(),
                display_name: str_field(tenant, "display_name", name).to_string(),
                authenticated: bool_field(tenant, "authenticated"),
                is_current: bool_field(tenant, "is_current"),
            }
        })
        .collect()
}

/// Step 2 of 3: choose a tenant database on the selected server.
#[derive(Debug)]
pub struct TenantSelection {
    server: String,
    tenants: Vec<TenantEntry>,
    cursor: usize,
    /// Name prompt for `tenant create`, open while `Some`.
    create_prompt: Option<TextInput>,
}

impl TenantSelection {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            tenants: Vec::new(),
            cursor: 0,
            create_prompt: None,
        }
    }

    fn load() -> Vec<Action> {
        vec![
            Action::info("Loading available tenant databases..."),
            Action::Execute(MonkCommand::TenantList),
        ]
    }

    fn select(&mut self, index: usize) -> Vec<Action> {
        let Some(tenant) = self.tenants.get(index) else {
            return vec![Action::warning("Invalid tenant selection")];
        };
        self.cursor = index;
        vec![
            Action::info(format!("Switching to tenant: {}", tenant.name)),
            Action::Execute(MonkCommand::TenantUse(tenant.name.clone())),
        ]
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
}

impl Screen for TenantSelection {
    fn id(&self) -> ScreenId {
        ScreenId::TenantSelection
    }

    fn title(&self) -> String {
        "VAULT DATABASE TENANT SELECTION".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        if self.create_prompt.is_some() {
            return vec![
                Binding::new(keys::ENTER, "create_tenant", "Create"),
                Binding::new(keys::CANCEL, "cancel", "Cancel"),
            ];
        }
        vec![
            Binding::new("1-9", "select_tenant", "Select"),
            Binding::new(keys::ENTER, "select_tenant", "Select"),
            Binding::new(keys::CREATE, "create_tenant", "Create Tenant"),
            Binding::new(keys::REFRESH, "refresh", "Refresh"),
            Binding::new(keys::BACK, "back", "Back to Servers"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Tenant)
    }

    fn captures_text(&self) -> bool {
        self.create_prompt.is_some()
    }

    fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
        Self::load()
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        if self.create_prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if let Some(index) = digit_index(&key) {
            return self.select(index);
        }
        if move_cursor(&mut self.cursor, self.tenants.len(), &key) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Enter => self.select(self.cursor),
            KeyCode::Char('c') => {
                self.create_prompt = Some(TextInput::new());
                vec![Action::info("Enter a name for the new tenant database")]
            }
            KeyCode::Char('r') | KeyCode::Char('f') => Self::load(),
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
            MonkCommand::TenantList => {
                if !result.succeeded || result.object().is_none() {
                    self.tenants.clear();
                    self.cursor = 0;
                    return vec![Action::error(format!(
                        "⚠ Tenant registry not found! {}. Use [c] CREATE TENANT to configure databases.",
                        result.error_or("monk CLI unavailable")
                    ))];
                }
                self.tenants = parse_tenants(result.value());
                self.tenants.truncate(MAX_TENANTS);
                self.cursor = self
                    .tenants
                    .iter()
                    .position(|t| t.is_current)
                    .unwrap_or(0);
                if self.tenants.is_empty() {
                    vec![Action::warning(
                        "No tenants configured. Use [c] CREATE TENANT to add one.",
                    )]
                } else {
                    vec![Action::info(format!(
                        "Found {} tenant databases. Press [1-9] to select.",
                        self.tenants.len()
                    ))]
                }
            }
            MonkCommand::TenantUse(name) => {
                if result.succeeded {
                    ctx.tenant = Some(name.clone());
                    vec![Action::Push(Box::new(SessionSelection::new(
                        self.server.clone(),
                        name.clone(),
                    )))]
                } else {
                    vec![Action::error(failure_text(
                        "Failed to switch tenant",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            MonkCommand::TenantCreate(name) => {
                if result.succeeded {
                    vec![
                        Action::success(format!("Tenant created: {name}")),
                        Action::Execute(MonkCommand::TenantList),
                    ]
                } else {
                    vec![Action::error(failure_text(
                        "Failed to create tenant",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            heading("STEP 2 of 3: Choose Tenant Database"),
            plain(format!("Server: {}", self.server)),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let [table_area, prompt_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(body);

        let rows: Vec<Vec<Cell>> = self
            .tenants
            .iter()
            .map(|t| {
                let auth = if t.authenticated {
                    Cell::styled("AUTH", theme::text())
                } else {
                    Cell::styled("NO_AUTH", theme::dim())
                };
                vec![
                    Cell::from(t.name.clone()),
                    Cell::from(t.display_name.clone()),
                    auth,
                    Cell::from(if t.is_current { "*" } else { "" }),
                ]
            })
            .collect();
        let table = KillboxTable::new(&["NAME", "DISPLAY NAME", "AUTH", "CURRENT"], &rows)
            .selected((!rows.is_empty()).then_some(self.cursor))
            .empty_text("No tenants available.");
        frame.render_widget(table, table_area);

        if let Some(prompt) = &self.create_prompt {
            frame.render_widget(InputField::new("NEW TENANT", prompt, true), prompt_area);
        }
    }

    fn selected(&self) -> Option<usize> {
        (!self.tenants.is_empty()).then_some(self.cursor)
    }
}
