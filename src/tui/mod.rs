//! Terminal User Interface for Vault-Tec.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
pub mod headless;
pub mod screen;
pub mod screens;
pub mod theme;
pub mod trace;
mod ui;
pub mod widgets;

pub use app::{App, Dispatch};
pub use events::{Event, EventHandler};

use crate::config::Config;
use crate::error::{Result, VaultError};
use crate::monk::{CommandResult, MonkClient};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use trace::TraceLog;
use tracing::{debug, info};

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum AsyncMessage {
    /// A monk command finished.
    CommandFinished {
        dispatch: Dispatch,
        result: CommandResult,
    },
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            event_handler: EventHandler::new(),
        })
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| VaultError::terminal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| VaultError::terminal(format!("Failed to enter alternate screen: {e}")))?;

        Terminal::new(CrosstermBackend::new(stdout))
            .map_err(|e| VaultError::terminal(format!("Failed to create terminal: {e}")))
    }

    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| VaultError::terminal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| VaultError::terminal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| VaultError::terminal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the event loop until the app stops.
    pub async fn run(&mut self, app: &mut App, client: MonkClient) -> Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let (tx, mut rx) = mpsc::channel::<AsyncMessage>(32);
        let (input_tx, mut input_rx) = mpsc::channel::<Result<Event>>(64);
        let handler = self.event_handler;
        spawn_input_task(move || handler.next(), input_tx);

        let result = self
            .run_event_loop(app, &client, tx, &mut rx, &mut input_rx)
            .await;

        let _ = panic::take_hook();
        result
    }

    async fn run_event_loop(
        &mut self,
        app: &mut App,
        client: &MonkClient,
        tx: mpsc::Sender<AsyncMessage>,
        rx: &mut mpsc::Receiver<AsyncMessage>,
        input_rx: &mut mpsc::Receiver<Result<Event>>,
    ) -> Result<()> {
        loop {
            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| VaultError::terminal(format!("Failed to draw: {e}")))?;

            if !app.running {
                break;
            }

            app.tick(Instant::now());
            for dispatch in app.take_dispatches() {
                spawn_dispatch(client.clone(), dispatch, tx.clone());
            }

            tokio::select! {
                Some(event) = input_rx.recv() => {
                    app.handle_event(event?);
                }

                Some(msg) = rx.recv() => {
                    handle_async_message(msg, app);
                }

                else => {
                    return Err(VaultError::internal("Input task stopped"));
                }
            }
        }

        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Polls input on one long-lived blocking task and forwards every event.
///
/// The task ends after the first error or once the receiver is dropped.
fn spawn_input_task<F>(mut next: F, tx: mpsc::Sender<Result<Event>>) -> JoinHandle<()>
where
    F: FnMut() -> Result<Event> + Send + 'static,
{
    tokio::task::spawn_blocking(move || loop {
        let event = next();
        let failed = event.is_err();
        if tx.blocking_send(event).is_err() || failed {
            break;
        }
    })
}

/// Runs a monk command on a tokio task; the result comes back over `tx`.
fn spawn_dispatch(client: MonkClient, dispatch: Dispatch, tx: mpsc::Sender<AsyncMessage>) {
    tokio::spawn(async move {
        let result = client.run(&dispatch.command).await;
        if tx
            .send(AsyncMessage::CommandFinished { dispatch, result })
            .await
            .is_err()
        {
            debug!("Event loop closed before command finished");
        }
    });
}

fn handle_async_message(msg: AsyncMessage, app: &mut App) {
    match msg {
        AsyncMessage::CommandFinished { dispatch, result } => app.deliver(dispatch, result),
    }
}

/// Starts the interactive UI.
pub async fn run(client: MonkClient, config: &Config, trace: Arc<TraceLog>) -> Result<()> {
    let (screen, context) = screens::initial_screen(config);
    info!(
        screen = screen.id().as_str(),
        monk = client.executable(),
        "Starting Vault-Tec Enterprise Suite"
    );
    let mut app = App::new(screen, context, trace);
    let mut tui = Tui::new()?;
    tui.run(&mut app, client).await
}
