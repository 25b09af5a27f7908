use super::{array_field, move_cursor, plain, render_frame, str_field};
use super::{EditorTarget, JsonEditor, SchemaWizard};
use crate::keys::{self, Binding, Domain};
use crate::mock::{SchemaStatus, VaultDataGenerator};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::confirm::{render_confirm_dialog, Severity};
use crate::tui::widgets::table::{Cell, KillboxTable};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
struct LabRow {
    name: String,
    version: String,
    records: String,
    status: SchemaStatus,
}

impl LabRow {
    fn live(item: &Value) -> Self {
        let name = match item {
            Value::String(name) => name.as_str(),
            other => str_field(other, "name", "unknown"),
        };
        Self {
            name: name.to_string(),
            version: str_field(item, "version", "-").to_string(),
            records: "-".to_string(),
            status: SchemaStatus::Deployed,
        }
    }
}

/// Schema names from `meta select`: a bare array, or one under `schemas`/`data`.
fn parse_schema_rows(value: &Value) -> Option<Vec<LabRow>> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => {
            let nested = array_field(Some(value), "schemas");
            if nested.is_empty() {
                array_field(Some(value), "data")
            } else {
                nested
            }
        }
        _ => return None,
    };
    Some(items.iter().map(LabRow::live).collect())
}

/// Research & development lab: browse and edit schema definitions.
#[derive(Debug)]
pub struct SchemaLab {
    rows: Vec<LabRow>,
    /// False while showing the demo registry.
    live: bool,
    cursor: usize,
    pending_delete: Option<String>,
    mock: VaultDataGenerator,
}

impl Default for SchemaLab {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLab {
    pub fn new() -> Self {
        Self::with_generator(VaultDataGenerator::new())
    }

    pub fn with_generator(mock: VaultDataGenerator) -> Self {
        Self {
            rows: Vec::new(),
            live: false,
            cursor: 0,
            pending_delete: None,
            mock,
        }
    }

    fn load_demo(&mut self) {
        self.live = false;
        self.rows = self
            .mock
            .schema_registry()
            .into_iter()
            .map(|row| LabRow {
                records: row.records(),
                name: row.name,
                version: row.version,
                status: row.status,
            })
            .collect();
    }

    fn stats(&self) -> String {
        let deployed = self
            .rows
            .iter()
            .filter(|r| r.status == SchemaStatus::Deployed)
            .count();
        format!(
            "Active Experiments: {} | Deployed: {deployed} | Under Development: {}",
            self.rows.len(),
            self.rows.len() - deployed
        )
    }

    fn selected_name(&self) -> Option<String> {
        self.rows.get(self.cursor).map(|r| r.name.clone())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => match self.pending_delete.take() {
                Some(name) => vec![
                    Action::info(format!("Deleting schema {name}...")),
                    Action::Execute(MonkCommand::MetaDelete(name)),
                ],
                None => Vec::new(),
            },
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.pending_delete = None;
                vec![Action::info("Deletion cancelled")]
            }
            _ => Vec::new(),
        }
    }
}

impl Screen for SchemaLab {
    fn id(&self) -> ScreenId {
        ScreenId::SchemaLab
    }

    fn title(&self) -> String {
        "SCHEMA REGISTRY".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        if self.pending_delete.is_some() {
            return vec![
                Binding::new("y", "confirm_delete", "Delete"),
                Binding::new("n", "cancel_delete", "Keep"),
            ];
        }
        vec![
            Binding::new("n", "new_schema", "New Schema"),
            Binding::new(keys::UPDATE, "update_record", "Edit Schema"),
            Binding::new(keys::DELETE, "delete_record", "Delete"),
            Binding::new(keys::REFRESH, "refresh", "Refresh"),
            Binding::new(keys::BACK, "back_to_overseer", "Back to Overseer"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Schema)
    }

    fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
        vec![
            Action::info("Loading schema registry..."),
            Action::Execute(MonkCommand::MetaSelect(None)),
        ]
    }

    fn on_resume(&mut self, _ctx: &mut Context) -> Vec<Action> {
        vec![Action::Execute(MonkCommand::MetaSelect(None))]
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        if self.pending_delete.is_some() {
            return self.handle_confirm_key(key);
        }
        if move_cursor(&mut self.cursor, self.rows.len(), &key) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('n') | KeyCode::Char('c') => {
                vec![Action::Push(Box::new(SchemaWizard::new()))]
            }
            KeyCode::Char('u') | KeyCode::Enter => match self.selected_name() {
                Some(name) => vec![
                    Action::info(format!("Loading schema {name}...")),
                    Action::Execute(MonkCommand::MetaSelect(Some(name))),
                ],
                None => vec![Action::warning("No schema selected")],
            },
            KeyCode::Char('d') => match self.selected_name() {
                Some(name) => {
                    self.pending_delete = Some(name);
                    Vec::new()
                }
                None => vec![Action::warning("No schema selected")],
            },
            KeyCode::Char('r') | KeyCode::Char('f') => vec![
                Action::info("Refreshing schema registry..."),
                Action::Execute(MonkCommand::MetaSelect(None)),
            ],
            KeyCode::Esc => vec![Action::Pop],
            _ => Vec::new(),
        }
    }

    fn on_result(
        &mut self,
        command: &MonkCommand,
        result: &CommandResult,
        _ctx: &mut Context,
    ) -> Vec<Action> {
        match command {
            MonkCommand::MetaSelect(None) => {
                let rows = result
                    .value()
                    .filter(|_| result.succeeded)
                    .and_then(parse_schema_rows);
                match rows {
                    Some(rows) => {
                        self.live = true;
                        self.rows = rows;
                        self.cursor = self.cursor.min(self.rows.len().saturating_sub(1));
                        vec![Action::info(format!("Loaded {} schemas", self.rows.len()))]
                    }
                    None => {
                        self.load_demo();
                        self.cursor = 0;
                        vec![Action::warning(
                            "Using demo schema registry - monk CLI not available",
                        )]
                    }
                }
            }
            MonkCommand::MetaSelect(Some(name)) => {
                // An unreadable definition still opens the editor, starting blank.
                let text = result
                    .value()
                    .filter(|_| result.succeeded)
                    .map(Value::to_string)
                    .unwrap_or_else(|| "{}".to_string());
                vec![Action::Push(Box::new(JsonEditor::new(
                    EditorTarget::UpdateSchema { name: name.clone() },
                    text,
                )))]
            }
            MonkCommand::MetaDelete(name) => {
                if result.succeeded {
                    vec![
                        Action::success(format!("Schema deleted: {name}")),
                        Action::Execute(MonkCommand::MetaSelect(None)),
                    ]
                } else {
                    vec![Action::error(failure_text(
                        "Failed to delete schema",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let source = if self.live { "live" } else { "demo data" };
        let intro = vec![
            plain(format!(
                "Current Vault: {}",
                ctx.tenant.as_deref().unwrap_or("no-tenant")
            )),
            plain("\"Schema configurations require precision. Results may vary.\""),
            plain(format!("{} ({source})", self.stats())),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);

        let rows: Vec<Vec<Cell>> = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    Cell::from(r.name.clone()),
                    Cell::from(r.version.clone()),
                    Cell::from(r.records.clone()),
                    Cell::styled(r.status.label(), theme::schema_status(r.status)),
                    Cell::from(r.status.actions()),
                ]
            })
            .collect();
        let table = KillboxTable::new(&["NAME", "VER", "RECORDS", "STATUS", "ACTIONS"], &rows)
            .selected(self.selected())
            .empty_text("No schemas defined.");
        frame.render_widget(table, body);

        if let Some(name) = &self.pending_delete {
            render_confirm_dialog(
                frame,
                area,
                "CONFIRM DELETION",
                &format!("Permanently delete schema '{name}' and its records?"),
                Severity::Destructive,
            );
        }
    }

    fn selected(&self) -> Option<usize> {
        (!self.rows.is_empty()).then_some(self.cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn lab() -> SchemaLab {
        let now = NaiveDate::from_ymd_opt(2077, 10, 23)
            .unwrap()
            .and_hms_opt(9, 47, 0)
            .unwrap();
        SchemaLab::with_generator(VaultDataGenerator::seeded(7, now))
    }

    fn loaded(stdout: &str) -> SchemaLab {
        let mut lab = lab();
        lab.on_result(
            &MonkCommand::MetaSelect(None),
            &CommandResult::from_process(0, stdout, ""),
            &mut Context::default(),
        );
        lab
    }

    #[test]
    fn test_live_rows_from_names_and_objects() {
        let lab = loaded(r#"["users", {"name": "robots", "version": "v2"}]"#);
        assert!(lab.live);
        let names: Vec<&str> = lab.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["users", "robots"]);
        assert_eq!(lab.rows[1].version, "v2");
    }

    #[test]
    fn test_yaml_list_output() {
        let lab = loaded("- users\n- accounts\n");
        assert_eq!(lab.rows.len(), 2);
    }

    #[test]
    fn test_demo_registry_when_unavailable() {
        let mut lab = lab();
        let actions = lab.on_result(
            &MonkCommand::MetaSelect(None),
            &CommandResult::from_process(1, "", ""),
            &mut Context::default(),
        );
        assert!(!lab.live);
        assert_eq!(lab.rows.len(), crate::mock::SCHEMA_NAMES.len());
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m.starts_with("Using demo")));
        assert!(lab.stats().starts_with(&format!(
            "Active Experiments: {}",
            crate::mock::SCHEMA_NAMES.len()
        )));
    }

    #[test]
    fn test_new_schema_opens_wizard() {
        let mut lab = loaded(r#"["users"]"#);
        let mut ctx = Context::default();
        let actions = lab.handle_key(press(KeyCode::Char('n')), &mut ctx);
        assert!(matches!(actions.as_slice(), [Action::Push(s)] if s.id() == ScreenId::SchemaWizard));
        assert!(!lab.captures_text());
    }

    #[test]
    fn test_update_fetches_definition_first() {
        let mut lab = loaded(r#"["users"]"#);
        let mut ctx = Context::default();
        let actions = lab.handle_key(press(KeyCode::Char('u')), &mut ctx);
        assert!(actions.iter().any(
            |a| matches!(a, Action::Execute(MonkCommand::MetaSelect(Some(n))) if n == "users")
        ));
        let actions = lab.on_result(
            &MonkCommand::MetaSelect(Some("users".into())),
            &CommandResult::from_process(0, r#"{"type":"object"}"#, ""),
            &mut ctx,
        );
        assert!(matches!(actions.as_slice(), [Action::Push(s)] if s.title() == "EDIT SCHEMA: users"));
    }

    #[test]
    fn test_delete_confirmation() {
        let mut lab = loaded(r#"["users"]"#);
        let mut ctx = Context::default();
        assert!(lab.handle_key(press(KeyCode::Char('d')), &mut ctx).is_empty());
        let actions = lab.handle_key(press(KeyCode::Char('y')), &mut ctx);
        assert!(actions.iter().any(
            |a| matches!(a, Action::Execute(MonkCommand::MetaDelete(n)) if n == "users")
        ));
    }
}
