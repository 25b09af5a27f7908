//! Busy indicator shown in the header while a monk command is running.

use std::time::Instant;

/// Braille spinner frames.
const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Animation speed in milliseconds per frame.
const FRAME_DURATION_MS: u128 = 100;

#[derive(Debug, Clone)]
pub struct Spinner {
    start_time: Instant,
    label: String,
}

impl Spinner {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            label: label.into(),
        }
    }

    /// Frame for `now`.
    pub fn frame_at(&self, now: Instant) -> &'static str {
        let elapsed_ms = now.saturating_duration_since(self.start_time).as_millis();
        FRAMES[(elapsed_ms / FRAME_DURATION_MS) as usize % FRAMES.len()]
    }

    pub fn display(&self) -> String {
        format!("{} {}", self.frame_at(Instant::now()), self.label)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}
