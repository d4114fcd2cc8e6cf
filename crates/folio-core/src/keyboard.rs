//! Modifier + arrow/Home/End section navigation

use crate::config::{KeyboardConfig, ModifierKey};

/// Keys the section navigator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Other,
}

impl NavKey {
    /// Parse DOM-style (`ArrowUp`) or short (`Up`) key names, case-insensitively
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "arrowup" | "up" => NavKey::ArrowUp,
            "arrowdown" | "down" => NavKey::ArrowDown,
            "home" => NavKey::Home,
            "end" => NavKey::End,
            _ => NavKey::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        alt: false,
        ctrl: false,
        shift: false,
        meta: false,
    };

    pub fn holds(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Alt => self.alt,
            ModifierKey::Ctrl => self.ctrl,
            ModifierKey::Shift => self.shift,
            ModifierKey::Meta => self.meta,
        }
    }

    /// Parse names like "alt", "ctrl"/"control", "shift", "meta"/"super"
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut modifiers = Modifiers::NONE;
        for name in names {
            match name.trim().to_ascii_lowercase().as_str() {
                "alt" | "option" => modifiers.alt = true,
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "meta" | "super" | "cmd" => modifiers.meta = true,
                _ => {}
            }
        }
        modifiers
    }
}

/// A key press delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: NavKey,
    pub modifiers: Modifiers,
}

impl KeyInput {
    pub fn new(key: NavKey, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn with_alt(key: NavKey) -> Self {
        Self::new(
            key,
            Modifiers {
                alt: true,
                ..Modifiers::NONE
            },
        )
    }
}

/// Registry-order movement requested by a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Previous,
    Next,
    First,
    Last,
}

/// Map a key press to a command; `None` when the modifier is not held
pub fn command_for(input: &KeyInput, config: &KeyboardConfig) -> Option<KeyCommand> {
    if !config.enabled || !input.modifiers.holds(config.modifier) {
        return None;
    }
    match input.key {
        NavKey::ArrowUp => Some(KeyCommand::Previous),
        NavKey::ArrowDown => Some(KeyCommand::Next),
        NavKey::Home => Some(KeyCommand::First),
        NavKey::End => Some(KeyCommand::Last),
        NavKey::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_modifier() {
        let config = KeyboardConfig::default();
        let plain = KeyInput::new(NavKey::End, Modifiers::NONE);
        assert_eq!(command_for(&plain, &config), None);
        assert_eq!(command_for(&KeyInput::with_alt(NavKey::End), &config), Some(KeyCommand::Last));
        assert_eq!(command_for(&KeyInput::with_alt(NavKey::Home), &config), Some(KeyCommand::First));
        assert_eq!(command_for(&KeyInput::with_alt(NavKey::ArrowUp), &config), Some(KeyCommand::Previous));
        assert_eq!(command_for(&KeyInput::with_alt(NavKey::Other), &config), None);
    }

    #[test]
    fn test_configured_modifier() {
        let config = KeyboardConfig {
            enabled: true,
            modifier: ModifierKey::Ctrl,
        };
        assert_eq!(command_for(&KeyInput::with_alt(NavKey::ArrowDown), &config), None);
        let ctrl = KeyInput::new(NavKey::ArrowDown, Modifiers::from_names(["ctrl"]));
        assert_eq!(command_for(&ctrl, &config), Some(KeyCommand::Next));
    }

    #[test]
    fn test_disabled() {
        let config = KeyboardConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(command_for(&KeyInput::with_alt(NavKey::End), &config), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(NavKey::from_name("ArrowUp"), NavKey::ArrowUp);
        assert_eq!(NavKey::from_name("down"), NavKey::ArrowDown);
        assert_eq!(NavKey::from_name("END"), NavKey::End);
        assert_eq!(NavKey::from_name("PageDown"), NavKey::Other);
    }
}
