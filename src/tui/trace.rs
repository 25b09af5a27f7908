//! Command trace: the last command sent to monk and the last response.
//!
//! [`TraceLog`] is installed as both bridge observers, so it is written from
//! whatever task ran the command and read by the renderer. Lines expire on
//! their own; nothing has to clear them.

use crate::monk::{CommandObserver, Payload, ResponseObserver};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How long the `CMD:` line stays visible.
pub const COMMAND_TTL: Duration = Duration::from_millis(2000);

/// How long the `RSP:` line stays visible.
pub const RESPONSE_TTL: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
struct TraceLine {
    text: String,
    at: Instant,
}

impl TraceLine {
    fn visible(&self, now: Instant, ttl: Duration) -> Option<&str> {
        (now.saturating_duration_since(self.at) < ttl).then_some(self.text.as_str())
    }
}

#[derive(Debug, Default)]
struct Lines {
    command: Option<TraceLine>,
    response: Option<TraceLine>,
}

/// Visible trace lines at some instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSnapshot {
    pub command: Option<String>,
    pub response: Option<String>,
}

#[derive(Debug, Default)]
pub struct TraceLog {
    lines: Mutex<Lines>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_lines(&self, f: impl FnOnce(&mut Lines)) {
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut lines);
    }

    pub fn record_command(&self, command_line: &str, data: Option<&Value>, at: Instant) {
        let text = match data {
            Some(data) => format!("monk {command_line} {data}"),
            None => format!("monk {command_line}"),
        };
        self.with_lines(|lines| lines.command = Some(TraceLine { text, at }));
    }

    pub fn record_response(&self, payload: &Payload, at: Instant) {
        let text = payload.compact();
        self.with_lines(|lines| lines.response = Some(TraceLine { text, at }));
    }

    /// Lines that have not yet expired at `now`.
    pub fn snapshot(&self, now: Instant) -> TraceSnapshot {
        let lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        TraceSnapshot {
            command: lines
                .command
                .as_ref()
                .and_then(|l| l.visible(now, COMMAND_TTL))
                .map(str::to_string),
            response: lines
                .response
                .as_ref()
                .and_then(|l| l.visible(now, RESPONSE_TTL))
                .map(str::to_string),
        }
    }
}

impl CommandObserver for TraceLog {
    fn command_sent(&self, command_line: &str, trace_data: Option<&Value>) {
        self.record_command(command_line, trace_data, Instant::now());
    }
}

impl ResponseObserver for TraceLog {
    fn response_received(&self, payload: &Payload) {
        self.record_response(payload, Instant::now());
    }
}
