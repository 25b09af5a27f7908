use super::{plain, render_frame};
use crate::keys::{self, Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crate::tui::screen::{failure_text, Action, Context, Screen, ScreenId};
use crate::tui::theme;
use crate::tui::widgets::input::{InputField, TextInput};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use serde_json::Value;

/// What the edited document will be sent as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorTarget {
    CreateRecord { schema: String },
    UpdateRecord { schema: String, id: String },
    CreateSchema { name: String },
    UpdateSchema { name: String },
}

impl EditorTarget {
    fn title(&self) -> String {
        match self {
            Self::CreateRecord { schema } => format!("NEW RECORD: {schema}"),
            Self::UpdateRecord { schema, id } => format!("EDIT RECORD: {schema}/{id}"),
            Self::CreateSchema { name } => format!("NEW SCHEMA: {name}"),
            Self::UpdateSchema { name } => format!("EDIT SCHEMA: {name}"),
        }
    }

    fn command(&self, document: Value) -> MonkCommand {
        match self.clone() {
            Self::CreateRecord { schema } => MonkCommand::DataCreate {
                schema,
                record: document,
            },
            Self::UpdateRecord { schema, id } => MonkCommand::DataUpdate {
                schema,
                id,
                record: Some(document),
            },
            Self::CreateSchema { name } => MonkCommand::MetaCreate {
                schema: name,
                definition: document,
            },
            Self::UpdateSchema { name } => MonkCommand::MetaUpdate {
                schema: name,
                definition: document,
            },
        }
    }

    fn saved_message(&self) -> String {
        match self {
            Self::CreateRecord { schema } => format!("Record created in {schema}"),
            Self::UpdateRecord { id, .. } => format!("Record updated: {id}"),
            Self::CreateSchema { name } => format!("Schema created: {name}"),
            Self::UpdateSchema { name } => format!("Schema updated: {name}"),
        }
    }
}

/// Parses editor text into a JSON object.
fn parse_document(text: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(text) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => Err("Document must be a JSON object".to_string()),
        Err(e) => Err(format!("Invalid JSON: {e}")),
    }
}

/// Single-line JSON editor for records and schema definitions.
#[derive(Debug)]
pub struct JsonEditor {
    target: EditorTarget,
    input: TextInput,
    saving: bool,
}

impl JsonEditor {
    pub fn new(target: EditorTarget, initial_text: impl Into<String>) -> Self {
        Self {
            target,
            input: TextInput::with_text(initial_text),
            saving: false,
        }
    }

    fn save(&mut self) -> Vec<Action> {
        if self.saving {
            return Vec::new();
        }
        match parse_document(self.input.value()) {
            Ok(document) => {
                self.saving = true;
                vec![
                    Action::info("Saving..."),
                    Action::Execute(self.target.command(document)),
                ]
            }
            Err(message) => vec![Action::error(message)],
        }
    }
}

impl Screen for JsonEditor {
    fn id(&self) -> ScreenId {
        ScreenId::JsonEditor
    }

    fn title(&self) -> String {
        self.target.title()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new(keys::ENTER, "save", "Save"),
            Binding::new("ctrl+u", "clear", "Clear"),
            Binding::new(keys::CANCEL, "cancel", "Cancel"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        match self.target {
            EditorTarget::CreateRecord { .. } | EditorTarget::UpdateRecord { .. } => {
                Some(Domain::Data)
            }
            EditorTarget::CreateSchema { .. } | EditorTarget::UpdateSchema { .. } => {
                Some(Domain::Schema)
            }
        }
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => vec![Action::Pop, Action::info("Edit cancelled")],
            KeyCode::Enter => self.save(),
            _ => {
                self.input.handle_key(key);
                Vec::new()
            }
        }
    }

    fn on_result(
        &mut self,
        command: &MonkCommand,
        result: &CommandResult,
        _ctx: &mut Context,
    ) -> Vec<Action> {
        if !matches!(
            command,
            MonkCommand::DataCreate { .. }
                | MonkCommand::DataUpdate { .. }
                | MonkCommand::MetaCreate { .. }
                | MonkCommand::MetaUpdate { .. }
        ) {
            return Vec::new();
        }
        self.saving = false;
        if result.succeeded {
            vec![Action::Pop, Action::success(self.target.saved_message())]
        } else {
            vec![Action::error(failure_text(
                "Save failed",
                result,
                "monk CLI unavailable",
            ))]
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            plain("Enter a JSON object. [ENTER] validates and saves, [ESC] cancels."),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let [input_area, check_area, _] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(body);
        frame.render_widget(InputField::new("JSON", &self.input, true), input_area);

        let check = match parse_document(self.input.value()) {
            Ok(_) => Span::styled("✓ valid JSON", theme::text()),
            Err(message) => Span::styled(format!("✗ {message}"), theme::dim()),
        };
        frame.render_widget(Paragraph::new(Line::from(check)), check_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn executed(actions: &[Action]) -> Option<MonkCommand> {
        actions.iter().find_map(|a| match a {
            Action::Execute(c) => Some(c.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_valid_record_creates() {
        let mut editor = JsonEditor::new(
            EditorTarget::CreateRecord {
                schema: "users".into(),
            },
            r#"{"name":"Lone Wanderer"}"#,
        );
        let actions = editor.handle_key(press(KeyCode::Enter), &mut Context::default());
        assert_eq!(
            executed(&actions),
            Some(MonkCommand::DataCreate {
                schema: "users".into(),
                record: json!({"name": "Lone Wanderer"}),
            })
        );
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let mut editor = JsonEditor::new(
            EditorTarget::UpdateSchema {
                name: "users".into(),
            },
            "{not json",
        );
        let actions = editor.handle_key(press(KeyCode::Enter), &mut Context::default());
        assert_eq!(executed(&actions), None);
        assert!(
            matches!(&actions[..], [Action::Status(_, m)] if m.starts_with("Invalid JSON: "))
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert_eq!(
            parse_document("[1, 2]"),
            Err("Document must be a JSON object".to_string())
        );
        assert!(parse_document(" {} ").is_ok());
    }

    #[test]
    fn test_update_record_command() {
        let target = EditorTarget::UpdateRecord {
            schema: "users".into(),
            id: "42".into(),
        };
        assert_eq!(
            target.command(json!({"age": 3})),
            MonkCommand::DataUpdate {
                schema: "users".into(),
                id: "42".into(),
                record: Some(json!({"age": 3})),
            }
        );
        assert_eq!(target.title(), "EDIT RECORD: users/42");
    }

    #[test]
    fn test_success_pops_failure_stays() {
        let target = EditorTarget::CreateSchema {
            name: "robots".into(),
        };
        let mut editor = JsonEditor::new(target.clone(), "{}");
        let command = target.command(json!({}));
        let mut ctx = Context::default();

        let actions = editor.on_result(
            &command,
            &CommandResult::from_process(1, "", "schema exists"),
            &mut ctx,
        );
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m == "Save failed: schema exists"));

        let actions = editor.on_result(&command, &CommandResult::from_process(0, "", ""), &mut ctx);
        assert!(matches!(actions.first(), Some(Action::Pop)));
        assert!(matches!(actions.last(), Some(Action::Status(_, m)) if m == "Schema created: robots"));
    }

    #[test]
    fn test_typing_edits_document() {
        let mut editor = JsonEditor::new(
            EditorTarget::CreateRecord {
                schema: "users".into(),
            },
            "",
        );
        let mut ctx = Context::default();
        for c in "{}".chars() {
            editor.handle_key(press(KeyCode::Char(c)), &mut ctx);
        }
        assert_eq!(editor.input.text(), "{}");
        assert!(editor.captures_text());
    }
}
