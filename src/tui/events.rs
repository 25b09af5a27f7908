//! Terminal input for the interactive UI.
//!
//! The loop polls crossterm on a blocking task with a short timeout so
//! screen timers (session checks, auto-proceed, dashboard refresh) keep
//! running when nobody is typing.

use crate::error::{Result, VaultError};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;

/// How long one poll waits before reporting a tick.
pub const TICK_RATE: Duration = Duration::from_millis(100);

/// Application events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Nothing happened within the tick rate.
    Tick,
}

impl Event {
    /// Maps a crossterm event; key releases and mouse/focus/paste input
    /// become ticks.
    fn translate(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => Self::Key(key),
            CrosstermEvent::Resize(width, height) => Self::Resize(width, height),
            _ => Self::Tick,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::with_tick_rate(TICK_RATE)
    }

    pub fn with_tick_rate(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Waits up to the tick rate for the next event. Blocks the thread.
    pub fn next(&self) -> Result<Event> {
        let ready = event::poll(self.tick_rate)
            .map_err(|e| VaultError::terminal(format!("Failed to poll events: {e}")))?;
        if !ready {
            return Ok(Event::Tick);
        }
        let event =
            event::read().map_err(|e| VaultError::terminal(format!("Failed to read event: {e}")))?;
        Ok(Event::translate(event))
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
