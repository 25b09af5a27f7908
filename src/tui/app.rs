//! Application state for the TUI.
//!
//! [`App`] owns the screen stack, the shared [`Context`] and the status line.
//! It never runs monk itself: `Execute` actions are queued as [`Dispatch`]es
//! which the runtime (or the headless runner) drains with
//! [`App::take_dispatches`] and answers with [`App::deliver`]. A result goes
//! back to the screen that asked for it, even if another screen has been
//! pushed on top in the meantime; results for popped screens are dropped.

use super::screen::{Action, Context, Screen, ScreenId, Status, StatusLevel};
use super::screens::QuitConfirmation;
use super::trace::{TraceLog, TraceSnapshot};
use super::widgets::spinner::Spinner;
use super::Event;
use crate::keys::{Binding, Domain};
use crate::monk::{CommandResult, MonkCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// A monk command waiting to run, tagged with the screen that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub screen: u64,
    pub command: MonkCommand,
}

struct Entry {
    key: u64,
    screen: Box<dyn Screen>,
}

/// Main application state.
pub struct App {
    /// Whether the application is still running.
    pub running: bool,
    pub context: Context,
    stack: Vec<Entry>,
    next_key: u64,
    status: Option<Status>,
    show_help: bool,
    pending: VecDeque<Dispatch>,
    in_flight: usize,
    spinner: Option<Spinner>,
    trace: Arc<TraceLog>,
}

impl App {
    /// Creates the app with `root` as the only screen and runs its `on_enter`.
    pub fn new(root: Box<dyn Screen>, context: Context, trace: Arc<TraceLog>) -> Self {
        let mut app = Self {
            running: true,
            context,
            stack: Vec::new(),
            next_key: 0,
            status: None,
            show_help: false,
            pending: VecDeque::new(),
            in_flight: 0,
            spinner: None,
            trace,
        };
        app.push(root);
        app
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spinner(&self) -> Option<&Spinner> {
        self.spinner.as_ref()
    }

    pub fn trace_snapshot(&self, now: Instant) -> TraceSnapshot {
        self.trace.snapshot(now)
    }

    fn top(&self) -> Option<&dyn Screen> {
        self.stack.last().map(|e| e.screen.as_ref())
    }

    pub fn current_id(&self) -> Option<ScreenId> {
        self.top().map(|s| s.id())
    }

    pub fn current_title(&self) -> String {
        self.top().map(|s| s.title()).unwrap_or_default()
    }

    pub fn current_bindings(&self) -> Vec<Binding> {
        self.top().map(|s| s.bindings()).unwrap_or_default()
    }

    pub fn current_domain(&self) -> Option<Domain> {
        self.top().and_then(|s| s.domain())
    }

    pub fn current_selected(&self) -> Option<usize> {
        self.top().and_then(|s| s.selected())
    }

    /// Top screen, for rendering.
    pub fn current_screen(&self) -> Option<&dyn Screen> {
        self.top()
    }

    /// Handles an event and updates application state.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            // ratatui redraws at the new size on the next frame
            Event::Resize(_, _) => {}
            Event::Tick => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.running = false;
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('h')) {
                self.show_help = false;
            }
            return;
        }

        let capturing = self.top().is_some_and(|s| s.captures_text());
        if !capturing {
            match key.code {
                KeyCode::Char('?') | KeyCode::Char('h') => {
                    self.show_help = true;
                    return;
                }
                KeyCode::Char('q') if self.current_id() != Some(ScreenId::QuitConfirmation) => {
                    self.push(Box::new(QuitConfirmation::new()));
                    return;
                }
                _ => {}
            }
        }

        let Some(entry) = self.stack.last_mut() else {
            return;
        };
        let key_id = entry.key;
        let actions = entry.screen.handle_key(key, &mut self.context);
        self.apply(key_id, actions);
    }

    /// Gives the top screen a chance to run timers.
    pub fn tick(&mut self, now: Instant) {
        let Some(entry) = self.stack.last_mut() else {
            return;
        };
        let key_id = entry.key;
        let actions = entry.screen.on_tick(now, &mut self.context);
        self.apply(key_id, actions);
    }

    /// Drains queued commands and marks them in flight.
    pub fn take_dispatches(&mut self) -> Vec<Dispatch> {
        let dispatches: Vec<Dispatch> = self.pending.drain(..).collect();
        if let Some(last) = dispatches.last() {
            self.in_flight += dispatches.len();
            self.spinner = Some(Spinner::new(last.command.name()));
        }
        dispatches
    }

    /// Routes a finished command back to the screen that issued it.
    pub fn deliver(&mut self, dispatch: Dispatch, result: CommandResult) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.in_flight == 0 {
            self.spinner = None;
        }

        let Some(entry) = self.stack.iter_mut().find(|e| e.key == dispatch.screen) else {
            debug!(command = %dispatch.command, "Dropping result for closed screen");
            return;
        };
        let actions = entry
            .screen
            .on_result(&dispatch.command, &result, &mut self.context);
        self.apply(dispatch.screen, actions);
    }

    fn push(&mut self, mut screen: Box<dyn Screen>) {
        let key = self.next_key;
        self.next_key += 1;
        debug!(screen = screen.id().as_str(), "Entering screen");
        let actions = screen.on_enter(&mut self.context);
        self.stack.push(Entry { key, screen });
        self.apply(key, actions);
    }

    fn pop(&mut self) {
        self.stack.pop();
        let Some(entry) = self.stack.last_mut() else {
            self.running = false;
            return;
        };
        let key = entry.key;
        let actions = entry.screen.on_resume(&mut self.context);
        self.apply(key, actions);
    }

    /// Applies actions emitted by the screen registered under `key`.
    fn apply(&mut self, key: u64, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Execute(command) => {
                    self.pending.push_back(Dispatch {
                        screen: key,
                        command,
                    });
                }
                Action::Push(screen) => {
                    self.status = None;
                    self.push(screen);
                }
                Action::Pop => {
                    self.status = None;
                    self.pop();
                }
                Action::Replace(screen) => {
                    self.status = None;
                    self.stack.pop();
                    self.push(screen);
                }
                Action::ResetTo(screen) => {
                    self.status = None;
                    self.stack.clear();
                    self.push(screen);
                }
                Action::Status(level, text) => {
                    self.status = Some(Status { level, text });
                }
                Action::Quit => {
                    self.running = false;
                }
            }
        }
    }

    /// Sets the status line from outside a screen.
    pub fn set_status(&mut self, level: StatusLevel, text: impl Into<String>) {
        self.status = Some(Status {
            level,
            text: text.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{layout::Rect, Frame};

    /// Test screen that records what happens to it.
    struct StubScreen {
        id: ScreenId,
        enter: Vec<MonkCommand>,
        results: Arc<std::sync::Mutex<Vec<String>>>,
        text_mode: bool,
    }

    impl StubScreen {
        fn new(id: ScreenId) -> Self {
            Self {
                id,
                enter: Vec::new(),
                results: Arc::default(),
                text_mode: false,
            }
        }
    }

    impl Screen for StubScreen {
        fn id(&self) -> ScreenId {
            self.id
        }

        fn title(&self) -> String {
            "STUB".into()
        }

        fn bindings(&self) -> Vec<Binding> {
            Vec::new()
        }

        fn captures_text(&self) -> bool {
            self.text_mode
        }

        fn on_enter(&mut self, _ctx: &mut Context) -> Vec<Action> {
            self.enter.drain(..).map(Action::Execute).collect()
        }

        fn handle_key(&mut self, key: KeyEvent, _ctx: &mut Context) -> Vec<Action> {
            match key.code {
                KeyCode::Char('n') => vec![Action::Push(Box::new(StubScreen::new(ScreenId::Registry)))],
                KeyCode::Esc => vec![Action::Pop],
                KeyCode::Char('s') => vec![Action::info("hello")],
                _ => Vec::new(),
            }
        }

        fn on_result(
            &mut self,
            command: &MonkCommand,
            result: &CommandResult,
            _ctx: &mut Context,
        ) -> Vec<Action> {
            self.results
                .lock()
                .unwrap()
                .push(format!("{}={}", command.name(), result.succeeded));
            Vec::new()
        }

        fn render(&self, _frame: &mut Frame, _area: Rect, _ctx: &Context) {}
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(root: StubScreen) -> App {
        App::new(Box::new(root), Context::new("root"), Arc::new(TraceLog::new()))
    }

    #[test]
    fn test_enter_queues_dispatches() {
        let mut root = StubScreen::new(ScreenId::ServerSelection);
        root.enter = vec![MonkCommand::ServerList];
        let mut app = app_with(root);

        let dispatches = app.take_dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].command, MonkCommand::ServerList);
        assert_eq!(app.in_flight(), 1);
        assert!(app.spinner().is_some());
        assert!(app.take_dispatches().is_empty());
    }

    #[test]
    fn test_result_reaches_covered_screen() {
        let mut root = StubScreen::new(ScreenId::ServerSelection);
        root.enter = vec![MonkCommand::ServerList];
        let results = Arc::clone(&root.results);
        let mut app = app_with(root);
        let dispatch = app.take_dispatches().remove(0);

        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.depth(), 2);

        app.deliver(dispatch, CommandResult::from_process(0, "{}", ""));
        assert_eq!(results.lock().unwrap().as_slice(), ["server list=true"]);
        assert_eq!(app.in_flight(), 0);
        assert!(app.spinner().is_none());
    }

    #[test]
    fn test_result_for_popped_screen_is_dropped() {
        let mut app = app_with(StubScreen::new(ScreenId::ServerSelection));
        let dispatch = Dispatch {
            screen: 99,
            command: MonkCommand::AuthStatus,
        };
        app.deliver(dispatch, CommandResult::from_process(0, "", ""));
        assert!(app.running);
    }

    #[test]
    fn test_pop_last_screen_stops() {
        let mut app = app_with(StubScreen::new(ScreenId::ServerSelection));
        app.handle_key(press(KeyCode::Char('n')));
        app.handle_key(press(KeyCode::Esc));
        assert_eq!(app.current_id(), Some(ScreenId::ServerSelection));
        assert!(app.running);
        app.handle_key(press(KeyCode::Esc));
        assert!(!app.running);
    }

    #[test]
    fn test_help_toggle_blocks_screen_keys() {
        let mut app = app_with(StubScreen::new(ScreenId::ServerSelection));
        app.handle_key(press(KeyCode::Char('?')));
        assert!(app.show_help());
        app.handle_key(press(KeyCode::Char('n')));
        assert_eq!(app.depth(), 1);
        app.handle_key(press(KeyCode::Esc));
        assert!(!app.show_help());
        assert!(app.running);
    }

    #[test]
    fn test_text_capture_suspends_globals() {
        let mut root = StubScreen::new(ScreenId::NewServer);
        root.text_mode = true;
        let mut app = app_with(root);
        app.handle_key(press(KeyCode::Char('?')));
        assert!(!app.show_help());
        app.handle_key(press(KeyCode::Char('q')));
        assert_eq!(app.depth(), 1);
    }

    #[test]
    fn test_q_opens_quit_confirmation() {
        let mut app = app_with(StubScreen::new(ScreenId::Overseer));
        app.handle_key(press(KeyCode::Char('q')));
        assert_eq!(app.current_id(), Some(ScreenId::QuitConfirmation));
        app.handle_key(press(KeyCode::Char('y')));
        assert!(!app.running);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app_with(StubScreen::new(ScreenId::Overseer));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn test_status_cleared_on_navigation() {
        let mut app = app_with(StubScreen::new(ScreenId::Overseer));
        app.handle_key(press(KeyCode::Char('s')));
        assert_eq!(app.status().map(|s| s.text.as_str()), Some("hello"));
        app.handle_key(press(KeyCode::Char('n')));
        assert!(app.status().is_none());
    }
}
