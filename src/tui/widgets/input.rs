//! Single-line text input.
//!
//! [`TextInput`] holds the text and cursor; [`InputField`] draws it as a
//! labelled row. The cursor is a character index, so multi-byte input is safe.

use crate::tui::theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::Widget,
};

/// Mask character for password fields.
const MASK: char = '*';

/// Editable text with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    /// Cursor position (character index).
    cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an input pre-filled with `text`, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text with surrounding whitespace removed.
    pub fn value(&self) -> &str {
        self.text.trim()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn set(&mut self, text: impl Into<String>) {
        *self = Self::with_text(text);
    }

    /// Clears the input and returns the previous text.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// Applies an editing key. Returns false if the key is not an editing key.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.take();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(),
            KeyCode::Right => self.move_right(),
            KeyCode::Home => self.move_home(),
            KeyCode::End => self.move_end(),
            _ => return false,
        }
        true
    }
}

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of characters to skip from the start of the text.
pub fn calculate_scroll_offset(cursor: usize, available_width: usize) -> usize {
    cursor.saturating_sub(available_width)
}

/// A labelled input row: `LABEL: text`.
pub struct InputField<'a> {
    label: &'a str,
    input: &'a TextInput,
    focused: bool,
    masked: bool,
}

impl<'a> InputField<'a> {
    pub fn new(label: &'a str, input: &'a TextInput, focused: bool) -> Self {
        Self {
            label,
            input,
            focused,
            masked: false,
        }
    }

    /// Shows `*` for every character.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    fn display_text(&self) -> String {
        if self.masked {
            std::iter::repeat(MASK).take(self.input.len()).collect()
        } else {
            self.input.text().to_string()
        }
    }
}

impl Widget for InputField<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let label_style = if self.focused {
            theme::title()
        } else {
            theme::dim()
        };
        let prefix = format!("{}: ", self.label);
        let prefix_width = prefix.chars().count();
        let available = (area.width as usize).saturating_sub(prefix_width + 1);
        let offset = calculate_scroll_offset(self.input.cursor(), available);
        let visible: String = self.display_text().chars().skip(offset).collect();

        let mut spans = vec![
            Span::styled(prefix, label_style),
            Span::styled(visible, theme::text()),
        ];
        if self.focused {
            spans.push(Span::styled(
                "_",
                theme::text().add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
