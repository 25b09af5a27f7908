use super::{heading, plain, record_id, render_frame, str_field};
use super::{EditorTarget, JsonEditor};
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::widgets::confirm::{render_confirm_dialog, Severity};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Paragraph, Wrap},
    Frame,
};
use serde_json::{Map, Value};

/// Keys shown in the information and metadata sections rather than as field data.
const SYSTEM_FIELDS: [&str; 6] = [
    "id",
    "created_at",
    "modified_at",
    "status",
    "created_by",
    "_metadata",
];
const MAX_ACTIVITY: usize = 5;
static NO_METADATA: Value = Value::Null;

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Opens the JSON editor on a record, without its `id`.
fn edit_record(schema: &str, record: &Value) -> Option<JsonEditor> {
    let id = record_id(record)?;
    let mut body = record.clone();
    if let Some(object) = body.as_object_mut() {
        object.remove("id");
    }
    Some(JsonEditor::new(
        EditorTarget::UpdateRecord {
            schema: schema.to_string(),
            id,
        },
        body.to_string(),
    ))
}

/// Read-only view of one record, with edit and delete.
#[derive(Debug)]
pub struct RecordView {
    schema: String,
    id: String,
    record: Value,
    confirm_delete: bool,
    deleting: bool,
}

impl RecordView {
    /// Returns None when the record has no usable `id`.
    pub fn new(schema: impl Into<String>, record: Value) -> Option<Self> {
        let id = record_id(&record)?;
        Some(Self {
            schema: schema.into(),
            id,
            record,
            confirm_delete: false,
            deleting: false,
        })
    }

    fn metadata(&self) -> &Value {
        self.record.get("_metadata").unwrap_or(&NO_METADATA)
    }

    fn field_lines(&self) -> Vec<Line<'static>> {
        let Some(object) = self.record.as_object() else {
            return vec![plain("  (record is not an object)")];
        };
        object
            .iter()
            .filter(|(name, _)| !SYSTEM_FIELDS.contains(&name.as_str()))
            .map(|(name, value)| plain(format!("  {:<20}{}", format!("{name}:"), display(value))))
            .collect()
    }

    fn metadata_lines(&self) -> Vec<Line<'static>> {
        let meta = self.metadata();
        let flag = |key: &str| meta.get(key).and_then(Value::as_bool).unwrap_or(true);
        let size = meta.get("size").map(display).unwrap_or_else(|| "Unknown".into());
        vec![
            plain(format!(
                "  {:<20}{:<24}{:<20}{}",
                "Record Size:",
                size,
                "Validation:",
                if flag("valid") { "✓ PASSED" } else { "✗ FAILED" }
            )),
            plain(format!(
                "  {:<20}{:<24}{:<20}{}",
                "Last Access:",
                str_field(meta, "last_access", "Unknown"),
                "Backup Status:",
                if flag("backed_up") { "✓ BACKED_UP" } else { "⚠ PENDING" }
            )),
        ]
    }

    fn activity_lines(&self) -> Vec<Line<'static>> {
        let entries = self
            .metadata()
            .get("recent_activity")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        if entries.is_empty() {
            return vec![plain("  No recent activity recorded")];
        }
        entries
            .iter()
            .take(MAX_ACTIVITY)
            .map(|entry| {
                plain(format!(
                    "  {} | {}",
                    str_field(entry, "timestamp", "Unknown"),
                    str_field(entry, "action", "Unknown")
                ))
            })
            .collect()
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Vec<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.confirm_delete = false;
                self.deleting = true;
                vec![
                    Action::info(format!("Deleting record {}...", self.id)),
                    Action::Execute(MonkCommand::DataDelete {
                        schema: self.schema.clone(),
                        id: self.id.clone(),
                    }),
                ]
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm_delete = false;
                vec![Action::info("Deletion cancelled")]
            }
            _ => Vec::new(),
        }
    }
}

impl Screen for RecordView {
    fn id(&self) -> ScreenId {
        ScreenId::RecordView
    }

    fn title(&self) -> String {
        format!("RECORD VIEW: {}/{}", self.schema, self.id)
    }

    fn bindings(&self) -> Vec<Binding> {
        if self.confirm_delete {
            return vec![
                Binding::new("y", "confirm_delete", "Delete"),
                Binding::new("n", "cancel_delete", "Keep"),
            ];
        }
        vec![
            Binding::new(keys::UPDATE, "edit_record", "Edit Record"),
            Binding::new(keys::DELETE, "delete_record", "Delete"),
            Binding::new(keys::BACK, "back_to_list", "Back"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Data)
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        if self.confirm_delete {
            return self.handle_confirm_key(key);
        }
        if self.deleting {
            return Vec::new();
        }
        match key.code {
            KeyCode::Char('u') | KeyCode::Enter => match edit_record(&self.schema, &self.record) {
                Some(editor) => vec![Action::Replace(Box::new(editor))],
                None => vec![Action::warning("Selected record has no id")],
            },
            KeyCode::Char('d') => {
                self.confirm_delete = true;
                Vec::new()
            }
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
        let MonkCommand::DataDelete { id, .. } = command else {
            return Vec::new();
        };
        self.deleting = false;
        if result.succeeded {
            vec![Action::Pop, Action::success(format!("Record deleted: {id}"))]
        } else {
            vec![Action::error(failure_text(
                "Failed to delete record",
                result,
                "monk CLI unavailable",
            ))]
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let empty = Map::new();
        let object = self.record.as_object().unwrap_or(&empty);
        let info = |key: &str, default: &str| {
            object
                .get(key)
                .map(display)
                .unwrap_or_else(|| default.to_string())
        };

        let mut lines = vec![
            heading("RECORD INFORMATION:"),
            plain(format!(
                "  {:<20}{:<24}{:<20}{}",
                "ID:", self.id, "Schema:", self.schema
            )),
            plain(format!(
                "  {:<20}{:<24}{:<20}{}",
                "Created:",
                info("created_at", "Unknown"),
                "Modified:",
                info("modified_at", "Unknown")
            )),
            plain(format!(
                "  {:<20}{:<24}{:<20}{}",
                "Status:",
                info("status", "unknown"),
                "Created By:",
                info("created_by", "system")
            )),
            plain(""),
            heading("FIELD DATA:"),
        ];
        lines.extend(self.field_lines());
        lines.push(plain(""));
        lines.push(heading("SYSTEM METADATA:"));
        lines.extend(self.metadata_lines());
        lines.push(plain(""));
        lines.push(heading("RECENT ACTIVITY:"));
        lines.extend(self.activity_lines());

        let body = render_frame(frame, area, &self.title(), Vec::new());
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body);

        if self.confirm_delete {
            render_confirm_dialog(
                frame,
                area,
                "CONFIRM DELETION",
                &format!("Permanently delete record '{}' from {}?", self.id, self.schema),
                Severity::Destructive,
            );
        }
    }
}
