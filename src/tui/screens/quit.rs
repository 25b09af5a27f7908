use crate::keys::Binding;
use crate::tui::screen::{Action, Context, Screen, ScreenId};
use crate::tui::widgets::confirm::{render_confirm_dialog, Severity};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};

/// "Are you sure?" before leaving the suite.
#[derive(Debug, Default)]
pub struct QuitConfirmation;

impl QuitConfirmation {
    pub fn new() -> Self {
        Self
    }
}

impl Screen for QuitConfirmation {
    fn id(&self) -> ScreenId {
        ScreenId::QuitConfirmation
    }

    fn title(&self) -> String {
        "EXIT CONFIRMATION".to_string()
    }

    fn bindings(&self) -> Vec<Binding> {
        vec![
            Binding::new("y", "confirm_quit", "Exit"),
            Binding::new("n", "cancel_quit", "Stay"),
            Binding::new("esc", "cancel_quit", "Stay"),
        ]
    }

    fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                vec![Action::info("Exiting Vault-Tec Enterprise Suite..."), Action::Quit]
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => vec![Action::Pop],
            _ => Vec::new(),
        }
    }

    fn render(&self, frame: &mut Frame, area: Rect, _ctx: &Context) {
        render_confirm_dialog(
            frame,
            area,
            "EXIT CONFIRMATION",
            "Are you sure you want to exit the Vault-Tec Enterprise Suite?",
            Severity::Notice,
        );
    }
}
