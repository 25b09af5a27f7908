//! Headless mode for scripted testing and automation.
//!
//! Runs the TUI without a terminal: scripted events drive the [`App`], monk
//! commands run inline as soon as a screen asks for them, and the rendered
//! screen is captured for assertions.

mod events;
mod output;

pub use events::{Assertion, Event, EventParser};
pub use output::{HeadlessOutput, ScreenRenderer};

use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::monk::MonkClient;
use crate::tui::app::App;
use crate::tui::screens;
use crate::tui::trace::TraceLog;
use crate::tui::ui;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Upper bound on command rounds after one event; stops screens that keep
/// re-issuing commands from spinning forever.
const MAX_DISPATCH_ROUNDS: usize = 16;

/// Configuration for headless mode execution.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Screen width in columns.
    pub width: u16,
    /// Screen height in rows.
    pub height: u16,
    pub output_format: OutputFormat,
    /// Whether to stop on first assertion failure.
    pub fail_fast: bool,
    /// Path to write output (None = stdout).
    pub output_file: Option<PathBuf>,
}

impl HeadlessConfig {
    /// Creates a HeadlessConfig from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (width, height) = cli.parse_screen_size().map_err(VaultError::config)?;
        let output_format = cli.parse_output_format().map_err(VaultError::config)?;

        Ok(Self {
            width,
            height,
            output_format,
            fail_fast: cli.fail_fast,
            output_file: cli.output_file.clone(),
        })
    }
}

/// Result of headless execution.
#[derive(Debug)]
pub struct HeadlessResult {
    /// Final screen content as text.
    pub screen: String,
    pub screen_lines: Vec<String>,
    pub events_executed: usize,
    /// Number of monk invocations made along the way.
    pub commands_run: usize,
    pub duration: Duration,
    pub assertions_passed: usize,
    pub assertions_failed: usize,
    /// The failed assertions, as written in the script.
    pub failures: Vec<String>,
    pub state: HeadlessState,
    /// Frame captures (for frames output mode).
    pub frames: Vec<Frame>,
}

/// Snapshot of application state for assertions and JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadlessState {
    /// Id of the top screen, e.g. `server_selection`.
    pub screen: String,
    /// Number of screens on the stack.
    pub depth: usize,
    pub status: Option<String>,
    pub status_level: Option<String>,
    pub running: bool,
    pub show_help: bool,
    /// Cursor position on list screens.
    pub selected: Option<usize>,
    /// Commands dispatched but not yet answered.
    pub in_flight: usize,
    pub server: Option<String>,
    pub tenant: Option<String>,
    pub authenticated: bool,
}

impl HeadlessState {
    pub fn from_app(app: &App) -> Self {
        Self {
            screen: app
                .current_id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            depth: app.depth(),
            status: app.status().map(|s| s.text.clone()),
            status_level: app.status().map(|s| format!("{:?}", s.level)),
            running: app.running,
            show_help: app.show_help(),
            selected: app.current_selected(),
            in_flight: app.in_flight(),
            server: app.context.server.clone(),
            tenant: app.context.tenant.clone(),
            authenticated: app.context.authenticated,
        }
    }

    /// Looks a field up by name for `assert:state:` checks.
    pub fn field(&self, name: &str) -> Option<String> {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        match name {
            "screen" => Some(self.screen.clone()),
            "depth" => Some(self.depth.to_string()),
            "status" => Some(optional(&self.status)),
            "status_level" => Some(optional(&self.status_level)),
            "running" => Some(self.running.to_string()),
            "show_help" => Some(self.show_help.to_string()),
            "selected" => self.selected.map(|s| s.to_string()),
            "in_flight" => Some(self.in_flight.to_string()),
            "server" => Some(optional(&self.server)),
            "tenant" => Some(optional(&self.tenant)),
            "authenticated" => Some(self.authenticated.to_string()),
            _ => None,
        }
    }
}

/// A captured frame (screen state after an event).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame number (0 = initial state).
    pub number: usize,
    /// Event that produced this frame (None for initial).
    pub event: Option<String>,
    pub screen: String,
}

/// Runs the TUI in headless mode.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    terminal: Terminal<TestBackend>,
    app: App,
    client: MonkClient,
    events: Vec<Event>,
    frames: Vec<Frame>,
    commands_run: usize,
    assertions_passed: usize,
    assertions_failed: usize,
    failures: Vec<String>,
}

impl HeadlessRunner {
    pub fn new(config: HeadlessConfig, app: App, client: MonkClient) -> Result<Self> {
        let backend = TestBackend::new(config.width, config.height);
        let terminal = Terminal::new(backend)
            .map_err(|e| VaultError::internal(format!("Failed to create test terminal: {e}")))?;

        Ok(Self {
            config,
            terminal,
            app,
            client,
            events: Vec::new(),
            frames: Vec::new(),
            commands_run: 0,
            assertions_passed: 0,
            assertions_failed: 0,
            failures: Vec::new(),
        })
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        self.events = EventParser::new().parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file, or stdin when `path` is `-`.
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| VaultError::internal(format!("Failed to read stdin: {e}")))?;
            buffer
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| VaultError::config(format!("Failed to read script file: {e}")))?
        };

        self.load_events(&content)
    }

    /// Runs the loaded events and returns the result.
    pub async fn run(mut self) -> Result<HeadlessResult> {
        let start_time = Instant::now();

        // Commands issued by the first screen's on_enter
        self.pump().await;
        self.capture_frame(None)?;

        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;

        for event in events {
            let event_str = event.to_string();
            debug!(event = %event_str, "headless event");

            match &event {
                Event::Key(key) => self.app.handle_key(*key),
                Event::Type(text) => {
                    for c in text.chars() {
                        self.app.handle_key(crossterm::event::KeyEvent::new(
                            crossterm::event::KeyCode::Char(c),
                            crossterm::event::KeyModifiers::NONE,
                        ));
                    }
                }
                Event::Wait(duration) => tokio::time::sleep(*duration).await,
                Event::Resize(w, h) => {
                    self.terminal
                        .resize(ratatui::layout::Rect::new(0, 0, *w, *h))
                        .map_err(|e| VaultError::internal(format!("Resize failed: {e}")))?;
                }
                Event::Snapshot(_) => {}
                Event::Assert(assertion) => {
                    let screen = self.render_screen()?;
                    let state = HeadlessState::from_app(&self.app);
                    if assertion.check(&screen, &state) {
                        self.assertions_passed += 1;
                    } else {
                        self.assertions_failed += 1;
                        self.failures.push(event_str.clone());
                        if self.config.fail_fast {
                            events_executed += 1;
                            break;
                        }
                    }
                }
            }

            self.pump().await;
            events_executed += 1;

            match (&event, self.config.output_format) {
                (_, OutputFormat::Frames) | (Event::Snapshot(_), _) => {
                    self.capture_frame(Some(event_str))?;
                }
                _ => self.draw()?,
            }

            if !self.app.running {
                break;
            }
        }

        let screen = self.render_screen()?;
        let screen_lines = screen.lines().map(String::from).collect();

        Ok(HeadlessResult {
            screen,
            screen_lines,
            events_executed,
            commands_run: self.commands_run,
            duration: start_time.elapsed(),
            assertions_passed: self.assertions_passed,
            assertions_failed: self.assertions_failed,
            failures: self.failures,
            state: HeadlessState::from_app(&self.app),
            frames: self.frames,
        })
    }

    /// Fires timers, then runs queued monk commands one by one and delivers
    /// their results, until no screen asks for more.
    async fn pump(&mut self) {
        for _ in 0..MAX_DISPATCH_ROUNDS {
            self.app.tick(Instant::now());
            let dispatches = self.app.take_dispatches();
            if dispatches.is_empty() {
                return;
            }
            for dispatch in dispatches {
                let result = self.client.run(&dispatch.command).await;
                self.commands_run += 1;
                self.app.deliver(dispatch, result);
            }
        }
        debug!("headless dispatch limit reached");
    }

    fn draw(&mut self) -> Result<()> {
        let app = &self.app;
        self.terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| VaultError::internal(format!("Failed to render: {e}")))?;
        Ok(())
    }

    fn render_screen(&mut self) -> Result<String> {
        self.draw()?;
        Ok(ScreenRenderer::render(self.terminal.backend().buffer()))
    }

    fn capture_frame(&mut self, event: Option<String>) -> Result<()> {
        let screen = self.render_screen()?;
        let number = self.frames.len();
        self.frames.push(Frame {
            number,
            event,
            screen,
        });
        Ok(())
    }
}

/// Runs headless mode and returns the process exit code.
pub async fn run_headless(
    cli: &Cli,
    config: &Config,
    client: MonkClient,
    trace: Arc<TraceLog>,
) -> Result<i32> {
    cli.validate_headless().map_err(VaultError::config)?;
    let headless = HeadlessConfig::from_cli(cli)?;

    let (screen, context) = screens::initial_screen(config);
    info!(
        screen = screen.id().as_str(),
        monk = client.executable(),
        "Starting headless run"
    );
    let app = App::new(screen, context, trace);
    let mut runner = HeadlessRunner::new(headless.clone(), app, client)?;

    if let Some(events) = &cli.events {
        runner.load_events(events)?;
    } else if let Some(script) = &cli.script {
        runner.load_script(script)?;
    }

    let result = runner.run().await?;
    let output = HeadlessOutput::new(headless.output_format).format(&result);

    if let Some(path) = &headless.output_file {
        std::fs::write(path, &output)
            .map_err(|e| VaultError::internal(format!("Failed to write output file: {e}")))?;
    } else {
        print!("{output}");
    }

    Ok(if result.assertions_failed > 0 { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monk::{ProcessOutput, ProcessRunner, RunError};
    use crate::tui::screens::ServerSelection;
    use crate::tui::screen::Context;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    /// Knows `server list`; everything else fails.
    struct ScriptedMonk;

    #[async_trait]
    impl ProcessRunner for ScriptedMonk {
        async fn run(
            &self,
            _executable: &str,
            arguments: &[String],
            _timeout: Duration,
        ) -> std::result::Result<ProcessOutput, RunError> {
            let key = arguments.iter().take(2).cloned().collect::<Vec<_>>().join(" ");
            let output = match key.as_str() {
                "server list" => ProcessOutput::new(
                    0,
                    r#"{"servers":[{"name":"local","endpoint":"http://localhost:9001","status":"up"},{"name":"prod","endpoint":"https://vault.example","status":"down"}]}"#,
                    "",
                ),
                _ => ProcessOutput::new(1, "", "unsupported"),
            };
            Ok(output)
        }
    }

    fn runner(events: &str) -> HeadlessRunner {
        let config = HeadlessConfig {
            width: 100,
            height: 32,
            output_format: OutputFormat::Text,
            fail_fast: false,
            output_file: None,
        };
        let client = MonkClient::with_runner("monk", Arc::new(ScriptedMonk));
        let app = App::new(
            Box::new(ServerSelection::new()),
            Context::new("overseer"),
            Arc::new(TraceLog::new()),
        );
        let mut runner = HeadlessRunner::new(config, app, client).unwrap();
        runner.load_events(events).unwrap();
        runner
    }

    #[tokio::test]
    async fn test_initial_commands_run_before_first_frame() {
        let result = runner("assert:contains:local").run().await.unwrap();
        assert_eq!(result.assertions_passed, 1);
        assert!(result.commands_run >= 1);
        assert_eq!(result.state.screen, "server_selection");
        assert_eq!(result.state.in_flight, 0);
    }

    #[tokio::test]
    async fn test_failed_assertion_is_recorded() {
        let result = runner("assert:state:screen=overseer,assert:state:depth=1")
            .run()
            .await
            .unwrap();
        assert_eq!(result.assertions_failed, 1);
        assert_eq!(result.assertions_passed, 1);
        assert_eq!(result.failures, vec!["assert:state:screen=overseer".to_string()]);
    }

    #[tokio::test]
    async fn test_fail_fast_stops_early() {
        let mut runner = runner("assert:contains:nowhere,key:q");
        runner.config.fail_fast = true;
        let result = runner.run().await.unwrap();
        assert_eq!(result.events_executed, 1);
        assert_eq!(result.state.depth, 1);
    }

    #[tokio::test]
    async fn test_quit_key_opens_confirmation() {
        let result = runner("key:q").run().await.unwrap();
        assert_eq!(result.state.screen, "quit_confirmation");
        assert_eq!(result.state.depth, 2);
    }

    #[tokio::test]
    async fn test_ctrl_c_stops_the_run() {
        let result = runner("key:ctrl+c,key:q").run().await.unwrap();
        assert!(!result.state.running);
        assert_eq!(result.events_executed, 1);
    }

    #[test]
    fn test_state_fields() {
        let state = HeadlessState {
            screen: "overseer".into(),
            depth: 1,
            status: None,
            status_level: None,
            running: true,
            show_help: false,
            selected: None,
            in_flight: 0,
            server: Some("local".into()),
            tenant: Some("vault-101".into()),
            authenticated: true,
        };
        assert_eq!(state.field("tenant").as_deref(), Some("vault-101"));
        assert_eq!(state.field("status").as_deref(), Some(""));
        assert_eq!(state.field("selected"), None);
        assert_eq!(state.field("authenticated").as_deref(), Some("true"));
    }
}
