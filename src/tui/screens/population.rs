use super::{array_field, move_cursor, plain, record_id, render_frame};
use super::{EditorTarget, FilterBuilder, JsonEditor, RecordView};
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::widgets::confirm::{render_confirm_dialog, Severity};
use crate::tui::widgets::input::{InputField, TextInput};
use crate::tui::widgets::table::{Cell, KillboxTable};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};
use serde_json::Value;

const DEFAULT_SCHEMA: &str = "personnel_records";
/// Columns shown besides `id`.
const MAX_FIELDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Schema,
    Filter,
    Results,
}

/// Records from `data select`: a bare array or one under `data`.
fn parse_records(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Object(_) => array_field(Some(value), "data").to_vec(),
        _ => Vec::new(),
    }
}

/// Visible field names, taken from the first record.
fn record_fields(records: &[Value]) -> Vec<String> {
    records
        .first()
        .and_then(Value::as_object)
        .map(|object| {
            object
                .keys()
                .filter(|k| k.as_str() != "id" && !k.starts_with('_'))
                .take(MAX_FIELDS)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Population management: query, create, edit and delete records.
#[derive(Debug)]
pub struct Population {
    schema: TextInput,
    filter: TextInput,
    focus: Focus,
    records: Vec<Value>,
    fields: Vec<String>,
    cursor: usize,
    /// Filter used for the records on screen.
    active_filter: Option<Value>,
    pending_delete: Option<String>,
}

impl Default for Population {
    fn default() -> Self {
        Self::new()
    }
}

impl Population {
    pub fn new() -> Self {
        Self {
            schema: TextInput::with_text(DEFAULT_SCHEMA),
            filter: TextInput::new(),
            focus: Focus::Results,
            records: Vec::new(),
            fields: Vec::new(),
            cursor: 0,
            active_filter: None,
            pending_delete: None,
        }
    }

    fn schema(&self) -> &str {
        self.schema.value()
    }

    /// Validates the inputs and builds `data select`.
    fn search(&mut self) -> Vec<Action> {
        if self.schema.is_empty() {
            self.focus = Focus::Schema;
            return vec![Action::warning("Schema required")];
        }
        let filter = if self.filter.is_empty() {
            None
        } else {
            match serde_json::from_str::<Value>(self.filter.value()) {
                Ok(value @ Value::Object(_)) => Some(value),
                Ok(_) => {
                    self.focus = Focus::Filter;
                    return vec![Action::error("Filter must be a JSON object")];
                }
                Err(e) => {
                    self.focus = Focus::Filter;
                    return vec![Action::error(format!("Invalid filter: {e}"))];
                }
            }
        };
        self.focus = Focus::Results;
        self.active_filter = filter.clone();
        vec![
            Action::info(format!("Searching {}...", self.schema())),
            Action::Execute(MonkCommand::DataSelect {
                schema: self.schema().to_string(),
                filter,
            }),
        ]
    }

    fn selected_record(&self) -> Option<&Value> {
        self.records.get(self.cursor)
    }

    fn view_selected(&self) -> Vec<Action> {
        let Some(record) = self.selected_record() else {
            return vec![Action::warning("No record selected")];
        };
        match RecordView::new(self.schema(), record.clone()) {
            Some(view) => vec![Action::Push(Box::new(view))],
            None => vec![Action::warning("Selected record has no id")],
        }
    }

    /// Takes over a filter left by the filter builder. An empty one clears the filter.
    fn adopt_filter(&mut self, ctx: &mut Context) {
        let Some(filter) = ctx.query_filter.take() else {
            return;
        };
        if filter.as_object().is_some_and(|object| object.is_empty()) {
            self.filter.take();
        } else {
            self.filter.set(filter.to_string());
        }
    }

    fn stats(&self) -> String {
        let filter = self
            .active_filter
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| "None".to_string());
        format!(
            "Population: {} | Schema: {} | Active Filters: {filter}",
            self.records.len(),
            self.schema()
        )
    }

    fn handle_input_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Enter => self.search(),
            KeyCode::Esc => {
                self.focus = Focus::Results;
                Vec::new()
            }
            _ => {
                match self.focus {
                    Focus::Schema => self.schema.handle_key(key),
                    _ => self.filter.handle_key(key),
                };
                Vec::new()
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => match self.pending_delete.take() {
                Some(id) => vec![
                    Action::info(format!("Deleting record {id}...")),
                    Action::Execute(MonkCommand::DataDelete {
                        schema: self.schema().to_string(),
                        id,
                    }),
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

impl Screen for Population {
    fn id(&self) -> ScreenId {
        ScreenId::Population
    }

    fn title(&self) -> String {
        "POPULATION MANAGEMENT".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        if self.pending_delete.is_some() {
            return vec![
                Binding::new("y", "confirm_delete", "Delete"),
                Binding::new("n", "cancel_delete", "Keep"),
            ];
        }
        if self.focus != Focus::Results {
            return vec![
                Binding::new(keys::ENTER, "execute_search", "Search"),
                Binding::new("tab", "next_field", "Next Field"),
                Binding::new(keys::CANCEL, "results", "Results"),
            ];
        }
        let mut bindings = keys::crud_bindings(true, true, true, true);
        bindings.extend([
            Binding::new(keys::SAVE, "execute_search", "Search"),
            Binding::new(keys::SELECT_NONE, "clear_filter", "Clear Filter"),
            Binding::new("tab", "edit_query", "Edit Query"),
            Binding::new(keys::REFRESH, "refresh", "Refresh"),
            Binding::new(keys::BACK, "back_to_overseer", "Back"),
        ]);
        bindings
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Data)
    }

    fn captures_text(&self) -> bool {
        self.focus != Focus::Results
    }

    fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
        self.search()
    }

    fn on_resume(&mut self, ctx: &mut Context) -> Vec<Action> {
        self.adopt_filter(ctx);
        self.search()
            .into_iter()
            .filter(|a| matches!(a, Action::Execute(_)))
            .collect()
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        if self.pending_delete.is_some() {
            return self.handle_confirm_key(key);
        }
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Results => Focus::Schema,
                    Focus::Schema => Focus::Filter,
                    Focus::Filter => Focus::Results,
                };
                return Vec::new();
            }
            KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Results => Focus::Filter,
                    Focus::Filter => Focus::Schema,
                    Focus::Schema => Focus::Results,
                };
                return Vec::new();
            }
            _ => {}
        }
        if self.focus != Focus::Results {
            return self.handle_input_key(key);
        }
        if move_cursor(&mut self.cursor, self.records.len(), &key) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('r') => self.search(),
            KeyCode::Char('f') => vec![Action::Push(Box::new(FilterBuilder::new(self.schema())))],
            KeyCode::Char('x') => {
                self.filter.take();
                let mut actions = vec![Action::info("Filter cleared")];
                actions.extend(self.search());
                actions
            }
            KeyCode::Char('c') => vec![Action::Push(Box::new(JsonEditor::new(
                EditorTarget::CreateRecord {
                    schema: self.schema().to_string(),
                },
                "{}",
            )))],
            KeyCode::Char('u') | KeyCode::Enter => self.view_selected(),
            KeyCode::Char('d') => match self.selected_record().map(record_id) {
                Some(Some(id)) => {
                    self.pending_delete = Some(id);
                    Vec::new()
                }
                Some(None) => vec![Action::warning("Selected record has no id")],
                None => vec![Action::warning("No record selected")],
            },
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
            MonkCommand::DataSelect { schema, .. } => {
                if !result.succeeded {
                    self.records.clear();
                    self.fields.clear();
                    self.cursor = 0;
                    return vec![Action::error(failure_text(
                        "Search failed",
                        result,
                        "monk CLI unavailable",
                    ))];
                }
                self.records = result.value().map(parse_records).unwrap_or_default();
                self.fields = record_fields(&self.records);
                self.cursor = self.cursor.min(self.records.len().saturating_sub(1));
                vec![Action::info(format!(
                    "Found {} records in {schema}",
                    self.records.len()
                ))]
            }
            MonkCommand::DataDelete { id, .. } => {
                if result.succeeded {
                    let mut actions = vec![Action::success(format!("Record deleted: {id}"))];
                    actions.extend(
                        self.search()
                            .into_iter()
                            .filter(|a| matches!(a, Action::Execute(_))),
                    );
                    actions
                } else {
                    vec![Action::error(failure_text(
                        "Failed to delete record",
                        result,
                        "monk CLI unavailable",
                    ))]
                }
            }
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, ctx: &Context) {
        let intro = vec![
            plain(format!(
                "Current Vault: {}",
                ctx.tenant.as_deref().unwrap_or("no-tenant")
            )),
            plain("\"Managing vault resident data with precision and care\""),
            plain(self.stats()),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let [schema_area, filter_area, table_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .areas(body);

        frame.render_widget(
            InputField::new("SCHEMA", &self.schema, self.focus == Focus::Schema),
            schema_area,
        );
        frame.render_widget(
            InputField::new("FILTER", &self.filter, self.focus == Focus::Filter),
            filter_area,
        );

        let headers: Vec<String> = std::iter::once("ID".to_string())
            .chain(self.fields.iter().map(|f| f.to_uppercase()))
            .collect();
        let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
        let rows: Vec<Vec<Cell>> = self
            .records
            .iter()
            .map(|record| {
                std::iter::once(Cell::from(record_id(record).unwrap_or_default()))
                    .chain(self.fields.iter().map(|f| Cell::from(cell_text(record.get(f)))))
                    .collect()
            })
            .collect();
        let table = KillboxTable::new(&header_refs, &rows)
            .selected(self.selected())
            .empty_text("No records found.");
        frame.render_widget(table, table_area);

        if let Some(id) = &self.pending_delete {
            render_confirm_dialog(
                frame,
                area,
                "CONFIRM DELETION",
                &format!("Permanently delete record '{id}' from {}?", self.schema()),
                Severity::Destructive,
            );
        }
    }

    fn selected(&self) -> Option<usize> {
        (!self.records.is_empty()).then_some(self.cursor)
    }
}
