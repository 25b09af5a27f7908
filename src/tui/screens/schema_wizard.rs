use super::{heading, plain, render_frame};
use super::{EditorTarget, JsonEditor};
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::input::{InputField, TextInput};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Description,
    TableName,
    Validation,
}

impl Field {
    const ORDER: [Field; 4] = [
        Self::Name,
        Self::Description,
        Self::TableName,
        Self::Validation,
    ];

    fn step(self, forward: bool) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        Self::ORDER[if forward { (i + 1) % len } else { (i + len - 1) % len }]
    }

    fn is_toggle(self) -> bool {
        self == Self::Validation
    }
}

/// Capitalizes each word, where any non-letter starts a new word:
/// `employee_evaluations` becomes `Employee_Evaluations`.
fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Table name derived from the schema name when none is given.
fn default_table_name(name: &str) -> String {
    name.to_lowercase().replace([' ', '-'], "_")
}

/// Guided creation of a schema definition for `meta create`.
#[derive(Debug)]
pub struct SchemaWizard {
    name: TextInput,
    description: TextInput,
    table_name: TextInput,
    /// Strict validation rejects properties the definition does not declare.
    validation: bool,
    focus: Field,
    saving: bool,
}

impl Default for SchemaWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaWizard {
    pub fn new() -> Self {
        Self {
            name: TextInput::new(),
            description: TextInput::new(),
            table_name: TextInput::new(),
            validation: true,
            focus: Field::Name,
            saving: false,
        }
    }

    fn table_name(&self) -> String {
        if self.table_name.is_empty() {
            default_table_name(self.name.value().trim())
        } else {
            self.table_name.value().trim().to_string()
        }
    }

    /// JSON Schema skeleton built from the form.
    fn definition(&self) -> Value {
        json!({
            "type": "object",
            "title": title_case(self.name.value().trim()),
            "description": self.description.value().trim(),
            "table_name": self.table_name(),
            "properties": {},
            "required": [],
            "additionalProperties": !self.validation,
        })
    }

    /// Name and description are both required.
    fn validate(&mut self) -> Result<(), Action> {
        if self.name.value().trim().is_empty() {
            self.focus = Field::Name;
            return Err(Action::warning("⚠ Schema name is required"));
        }
        if self.description.value().trim().is_empty() {
            self.focus = Field::Description;
            return Err(Action::warning("⚠ Description is required"));
        }
        Ok(())
    }

    fn save(&mut self) -> Vec<Action> {
        if self.saving {
            return Vec::new();
        }
        if let Err(action) = self.validate() {
            return vec![action];
        }
        self.saving = true;
        vec![
            Action::info("Creating schema..."),
            Action::Execute(MonkCommand::MetaCreate {
                schema: self.name.value().trim().to_string(),
                definition: self.definition(),
            }),
        ]
    }

    /// Hands the generated definition to the raw JSON editor.
    fn open_editor(&mut self) -> Vec<Action> {
        if let Err(action) = self.validate() {
            return vec![action];
        }
        vec![Action::Replace(Box::new(JsonEditor::new(
            EditorTarget::CreateSchema {
                name: self.name.value().trim().to_string(),
            },
            self.definition().to_string(),
        )))]
    }

    fn toggle_line(&self, label: &str, on: bool, focused: bool) -> Line<'static> {
        let style = if focused { theme::title() } else { theme::dim() };
        let mark = if on { "[x]" } else { "[ ]" };
        Line::from(vec![
            Span::styled(format!("{mark} "), if focused { theme::selected() } else { theme::text() }),
            Span::styled(label.to_string(), style),
        ])
    }
}

impl Screen for SchemaWizard {
    fn id(&self) -> ScreenId {
        ScreenId::SchemaWizard
    }

    fn title(&self) -> String {
        "NEW EXPERIMENTAL PROTOCOL".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new(keys::ENTER, "save_schema", "Save"),
            Binding::new("tab", "focus_next", "Next Field"),
            Binding::new("ctrl+e", "edit_json", "Edit JSON"),
            Binding::new(keys::CANCEL, "back_to_lab", "Back"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Schema)
    }

    fn captures_text(&self) -> bool {
        !self.focus.is_toggle()
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => return vec![Action::Pop, Action::info("Schema creation cancelled")],
            KeyCode::Enter => return self.save(),
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return self.open_editor()
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.step(true);
                return Vec::new();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.step(false);
                return Vec::new();
            }
            _ => {}
        }

        match self.focus {
            Field::Name => {
                self.name.handle_key(key);
            }
            Field::Description => {
                self.description.handle_key(key);
            }
            Field::TableName => {
                self.table_name.handle_key(key);
            }
            Field::Validation => {
                if matches!(key.code, KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    self.validation = !self.validation;
                }
            }
        }
        Vec::new()
    }

    fn on_result(
        &mut self,
        command: &MonkCommand,
        result: &CommandResult,
        _ctx: &mut Context,
    ) -> Vec<Action> {
        let MonkCommand::MetaCreate { schema, .. } = command else {
            return Vec::new();
        };
        self.saving = false;
        if result.succeeded {
            vec![
                Action::Pop,
                Action::success(format!("Schema created successfully: {schema}")),
            ]
        } else {
            vec![Action::error(failure_text(
                "Schema creation failed",
                result,
                "monk CLI unavailable",
            ))]
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            plain("\"New schemas require careful consideration and proper forms.\""),
            plain(""),
            heading("BASIC INFORMATION"),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let rows = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(body);

        frame.render_widget(
            InputField::new("SCHEMA NAME", &self.name, self.focus == Field::Name),
            rows[0],
        );
        frame.render_widget(
            InputField::new(
                "DESCRIPTION",
                &self.description,
                self.focus == Field::Description,
            ),
            rows[1],
        );
        frame.render_widget(
            InputField::new("TABLE NAME", &self.table_name, self.focus == Field::TableName),
            rows[2],
        );
        frame.render_widget(Paragraph::new(heading("DEPLOYMENT SETTINGS")), rows[3]);
        frame.render_widget(
            Paragraph::new(self.toggle_line(
                "Enable data validation",
                self.validation,
                self.focus == Field::Validation,
            )),
            rows[4],
        );
        let table = self.table_name();
        let summary = if table.is_empty() {
            "Ready to create new schema - fill required fields and press ENTER".to_string()
        } else {
            format!("Table: {table} | Ready to create - press ENTER")
        };
        frame.render_widget(Paragraph::new(plain(summary)), rows[5]);
    }
}
