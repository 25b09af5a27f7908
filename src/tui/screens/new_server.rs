use super::{heading, plain, render_frame};
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

const DEFAULT_PORT: &str = "9001";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Hostname,
    Port,
    Protocol,
    Description,
}

impl Field {
    const ORDER: [Field; 5] = [
        Self::Name,
        Self::Hostname,
        Self::Port,
        Self::Protocol,
        Self::Description,
    ];

    fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protocol {
    Http,
    Https,
}

impl Protocol {
    fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Self::Http => Self::Https,
            Self::Https => Self::Http,
        }
    }
}

/// Registers a new facility with `server add`.
#[derive(Debug)]
pub struct NewServer {
    name: TextInput,
    hostname: TextInput,
    port: TextInput,
    protocol: Protocol,
    description: TextInput,
    focus: Field,
}

impl Default for NewServer {
    fn default() -> Self {
        Self::new()
    }
}

impl NewServer {
    pub fn new() -> Self {
        Self {
            name: TextInput::new(),
            hostname: TextInput::new(),
            port: TextInput::with_text(DEFAULT_PORT),
            protocol: Protocol::Http,
            description: TextInput::new(),
            focus: Field::Name,
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            Field::Name => Some(&mut self.name),
            Field::Hostname => Some(&mut self.hostname),
            Field::Port => Some(&mut self.port),
            Field::Protocol => None,
            Field::Description => Some(&mut self.description),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}://{}:{}",
            self.protocol.as_str(),
            self.hostname.value(),
            self.port.value()
        )
    }

    /// Validates the form and builds the `server add` command.
    fn save(&mut self) -> Vec<Action> {
        let missing = [
            (Field::Name, &self.name, "⚠ Server name required"),
            (Field::Hostname, &self.hostname, "⚠ Hostname required"),
            (Field::Port, &self.port, "⚠ Port required"),
        ]
        .into_iter()
        .find(|(_, input, _)| input.is_empty())
        .map(|(field, _, message)| (field, message));
        if let Some((field, message)) = missing {
            self.focus = field;
            return vec![Action::warning(message)];
        }

        let description = self.description.value();
        vec![
            Action::info("Adding server configuration..."),
            Action::Execute(MonkCommand::ServerAdd {
                name: self.name.value().to_string(),
                endpoint: self.endpoint(),
                description: (!description.is_empty()).then(|| description.to_string()),
            }),
        ]
    }

    fn field_line(&self, field: Field) -> (&'static str, Option<&TextInput>) {
        match field {
            Field::Name => ("SERVER NAME", Some(&self.name)),
            Field::Hostname => ("HOSTNAME", Some(&self.hostname)),
            Field::Port => ("PORT", Some(&self.port)),
            Field::Protocol => ("PROTOCOL", None),
            Field::Description => ("DESCRIPTION", Some(&self.description)),
        }
    }
}

impl Screen for NewServer {
    fn id(&self) -> ScreenId {
        ScreenId::NewServer
    }

    fn title(&self) -> String {
        "NEW VAULT FACILITY".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new("tab", "next_field", "Next Field"),
            Binding::new(keys::ENTER, "save_server", "Save & Add"),
            Binding::new(keys::CANCEL, "cancel", "Cancel"),
        ]
    }

    fn domain(&self) -> Option<Domain> {
        Some(Domain::Server)
    }

    fn captures_text(&self) -> bool {
        self.focus != Field::Protocol
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        match key.code {
            KeyCode::Esc => return vec![Action::Pop],
            KeyCode::Enter => return self.save(),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                return Vec::new();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                return Vec::new();
            }
            _ => {}
        }

        if self.focus == Field::Protocol {
            if matches!(key.code, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
                self.protocol = self.protocol.toggled();
            }
            return Vec::new();
        }
        if let Some(input) = self.focused_input() {
            input.handle_key(key);
        }
        Vec::new()
    }

    fn on_result(
        &mut self,
        command: &MonkCommand,
        result: &CommandResult,
        _ctx: &mut Context,
    ) -> Vec<Action> {
        match command {
            MonkCommand::ServerAdd { name, .. } if result.succeeded => {
                vec![Action::Pop, Action::success(format!("Server added: {name}"))]
            }
            MonkCommand::ServerAdd { .. } => vec![Action::error(failure_text(
                "Failed to add server",
                result,
                "monk CLI unavailable",
            ))],
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        let intro = vec![
            heading("Register a new Vault-Tec facility for network access"),
            plain(""),
        ];
        let body = render_frame(frame, area, &self.title(), intro);
        let rows = Layout::vertical(
            Field::ORDER
                .iter()
                .map(|_| Constraint::Length(2))
                .chain([Constraint::Length(1), Constraint::Min(0)]),
        )
        .split(body);

        for (i, field) in Field::ORDER.iter().enumerate() {
            let focused = *field == self.focus;
            match self.field_line(*field) {
                (label, Some(input)) => {
                    frame.render_widget(InputField::new(label, input, focused), rows[i]);
                }
                (label, None) => {
                    let style = if focused { theme::title() } else { theme::dim() };
                    let choice = |p: Protocol| {
                        let text = format!(" {} ", p.as_str().to_uppercase());
                        if p == self.protocol {
                            Span::styled(text, theme::selected())
                        } else {
                            Span::styled(text, theme::text())
                        }
                    };
                    let line = Line::from(vec![
                        Span::styled(format!("{label}: "), style),
                        choice(Protocol::Http),
                        Span::raw(" "),
                        choice(Protocol::Https),
                    ]);
                    frame.render_widget(Paragraph::new(line), rows[i]);
                }
            }
        }
        let preview = Line::from(vec![
            Span::styled("ENDPOINT: ", theme::dim()),
            Span::styled(self.endpoint(), theme::text()),
        ]);
        frame.render_widget(Paragraph::new(preview), rows[Field::ORDER.len()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut NewServer, text: &str) {
        let mut ctx = Context::default();
        for c in text.chars() {
            screen.handle_key(press(KeyCode::Char(c)), &mut ctx);
        }
    }

    #[test]
    fn test_save_builds_endpoint() {
        let mut screen = NewServer::new();
        let mut ctx = Context::default();
        type_text(&mut screen, "east");
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        type_text(&mut screen, "vault-prod-east.corp");
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        screen.handle_key(press(KeyCode::Right), &mut ctx);
        screen.handle_key(press(KeyCode::Tab), &mut ctx);
        type_text(&mut screen, "East Coast");

        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        let command = actions.iter().find_map(|a| match a {
            Action::Execute(c) => Some(c.clone()),
            _ => None,
        });
        assert_eq!(
            command,
            Some(MonkCommand::ServerAdd {
                name: "east".into(),
                endpoint: "https://vault-prod-east.corp:9001".into(),
                description: Some("East Coast".into()),
            })
        );
    }

    #[test]
    fn test_validation_messages() {
        let mut screen = NewServer::new();
        let mut ctx = Context::default();
        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m == "⚠ Server name required"));

        type_text(&mut screen, "east");
        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m == "⚠ Hostname required"));
        assert_eq!(screen.focus, Field::Hostname);

        type_text(&mut screen, "host");
        screen.port.take();
        let actions = screen.handle_key(press(KeyCode::Enter), &mut ctx);
        assert!(matches!(&actions[..], [Action::Status(_, m)] if m == "⚠ Port required"));
    }

    #[test]
    fn test_text_capture_follows_focus() {
        let mut screen = NewServer::new();
        assert!(screen.captures_text());
        screen.focus = Field::Protocol;
        assert!(!screen.captures_text());
    }

    #[test]
    fn test_success_pops() {
        let mut screen = NewServer::new();
        let command = MonkCommand::ServerAdd {
            name: "east".into(),
            endpoint: "http://h:1".into(),
            description: None,
        };
        let actions = screen.on_result(
            &command,
            &CommandResult::from_process(0, "", ""),
            &mut Context::default(),
        );
        assert!(matches!(actions.first(), Some(Action::Pop)));
    }
}
