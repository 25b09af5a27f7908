//! Standard key conventions shared by every screen.
//!
//! The same letter does the same thing everywhere: `f` finds, `c` creates,
//! `d` deletes, `u` updates or uses, `Esc` goes back. Screens build their
//! footers from these bindings, and the help overlay uses [`monk_command_for`]
//! to show which monk command sits behind a key.

use crossterm::event::{KeyCode, KeyEvent};

pub const FIND: &str = "f";
pub const CREATE: &str = "c";
pub const DELETE: &str = "d";
pub const UPDATE: &str = "u";

pub const BACK: &str = "esc";
pub const REFRESH: &str = "r";
pub const HELP: &str = "h";

pub const SELECT_ALL: &str = "a";
pub const SELECT_NONE: &str = "x";
pub const ENTER: &str = "enter";

pub const EXPORT: &str = "e";
pub const IMPORT: &str = "i";
pub const TEST: &str = "t";
pub const SAVE: &str = "s";
pub const CANCEL: &str = "esc";

/// A key shown in a footer or the help overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Key name: a single character, or `esc`, `enter`, `up`, `down`, `tab`, `1-9`.
    pub key: &'static str,
    pub action: &'static str,
    pub description: &'static str,
}

impl Binding {
    pub const fn new(key: &'static str, action: &'static str, description: &'static str) -> Self {
        Self {
            key,
            action,
            description,
        }
    }

    /// Killbox label, e.g. `[F]`, `[ESC]`, `[1-9]`.
    pub fn label(&self) -> String {
        format!("[{}]", self.key.to_uppercase())
    }

    /// Returns true if `event` presses this binding's key.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        match (self.key, event.code) {
            ("esc", KeyCode::Esc) => true,
            ("enter", KeyCode::Enter) => true,
            ("tab", KeyCode::Tab) => true,
            ("up", KeyCode::Up) => true,
            ("down", KeyCode::Down) => true,
            (key, KeyCode::Char(c)) => {
                let mut chars = key.chars();
                chars.next() == Some(c) && chars.next().is_none()
            }
            _ => false,
        }
    }
}

/// Find/create/delete/update bindings, each individually optional.
pub fn crud_bindings(find: bool, create: bool, delete: bool, update: bool) -> Vec<Binding> {
    let mut bindings = Vec::new();
    if find {
        bindings.push(Binding::new(FIND, "find_records", "Find"));
    }
    if create {
        bindings.push(Binding::new(CREATE, "create_record", "Create"));
    }
    if delete {
        bindings.push(Binding::new(DELETE, "delete_record", "Delete"));
    }
    if update {
        bindings.push(Binding::new(UPDATE, "update_record", "Update"));
    }
    bindings
}

pub fn navigation_bindings() -> Vec<Binding> {
    vec![
        Binding::new(BACK, "back", "Back"),
        Binding::new(REFRESH, "refresh", "Refresh"),
        Binding::new(HELP, "help", "Help"),
    ]
}

pub fn selection_bindings() -> Vec<Binding> {
    vec![
        Binding::new(SELECT_ALL, "select_all", "Select All"),
        Binding::new(SELECT_NONE, "select_none", "Clear"),
        Binding::new(ENTER, "default_action", "Edit"),
    ]
}

/// Resource family a screen manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    Server,
    Tenant,
    Schema,
    Data,
}

/// The monk command a standard key runs in `domain`.
pub fn monk_command_for(domain: Domain, key: &str) -> Option<&'static str> {
    let command = match (domain, key) {
        (Domain::Server, FIND) => "server list --json",
        (Domain::Server, CREATE) => "server add",
        (Domain::Server, DELETE) => "server delete",
        (Domain::Server, UPDATE) => "server use",
        (Domain::Server, TEST) => "server ping",

        (Domain::Tenant, FIND) => "tenant list --json",
        (Domain::Tenant, CREATE) => "tenant create",
        (Domain::Tenant, DELETE) => "tenant delete",
        (Domain::Tenant, UPDATE) => "tenant use",

        (Domain::Schema, FIND) => "meta select",
        (Domain::Schema, CREATE) => "meta create",
        (Domain::Schema, DELETE) => "meta delete",
        (Domain::Schema, UPDATE) => "meta update",

        (Domain::Data, FIND) => "data select",
        (Domain::Data, CREATE) => "data create",
        (Domain::Data, DELETE) => "data delete",
        (Domain::Data, UPDATE) => "data update",

        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_crud_bindings_respect_flags() {
        let keys: Vec<&str> = crud_bindings(true, false, true, false)
            .iter()
            .map(|b| b.key)
            .collect();
        assert_eq!(keys, vec!["f", "d"]);
        assert_eq!(crud_bindings(true, true, true, true).len(), 4);
    }

    #[test]
    fn test_navigation_and_selection() {
        let nav = navigation_bindings();
        assert_eq!(nav[0].key, "esc");
        assert_eq!(nav[0].label(), "[ESC]");
        let sel = selection_bindings();
        assert_eq!(sel[2].description, "Edit");
    }

    #[test]
    fn test_binding_matches() {
        let find = Binding::new(FIND, "find_records", "Find");
        assert!(find.matches(&press(KeyCode::Char('f'))));
        assert!(!find.matches(&press(KeyCode::Char('F'))));
        assert!(!find.matches(&press(KeyCode::Esc)));

        let back = Binding::new(BACK, "back", "Back");
        assert!(back.matches(&press(KeyCode::Esc)));

        let range = Binding::new("1-9", "select", "Select");
        assert!(!range.matches(&press(KeyCode::Char('1'))));
    }

    #[test]
    fn test_monk_command_lookup() {
        assert_eq!(
            monk_command_for(Domain::Server, FIND),
            Some("server list --json")
        );
        assert_eq!(monk_command_for(Domain::Server, TEST), Some("server ping"));
        assert_eq!(monk_command_for(Domain::Tenant, UPDATE), Some("tenant use"));
        assert_eq!(monk_command_for(Domain::Schema, CREATE), Some("meta create"));
        assert_eq!(monk_command_for(Domain::Data, DELETE), Some("data delete"));
        assert_eq!(monk_command_for(Domain::Tenant, TEST), None);
        assert_eq!(monk_command_for(Domain::Data, REFRESH), None);
    }
}
