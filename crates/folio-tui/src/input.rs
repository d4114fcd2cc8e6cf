use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use folio_core::keyboard::{KeyInput, Modifiers, NavKey};

use crate::keymap::{KeyBinding, Keymap};

/// Actions that can be triggered by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    ToggleMenu,
    CloseMenu,
    /// Forwarded to the page's section navigator
    PageKey(KeyInput),
    None,
}

/// Resolve a key press: configured bindings first, then page navigation keys
pub fn handle_key_event(key: KeyEvent, keymap: &Keymap) -> Action {
    let binding = KeyBinding::new(key.code, key.modifiers);
    if let Some(action) = keymap.get(&binding) {
        return *action;
    }

    match key_input(&key) {
        Some(input) => Action::PageKey(input),
        None => Action::None,
    }
}

/// Translate a terminal key press into the page's key model
pub fn key_input(key: &KeyEvent) -> Option<KeyInput> {
    let nav = match key.code {
        KeyCode::Up => NavKey::ArrowUp,
        KeyCode::Down => NavKey::ArrowDown,
        KeyCode::Home => NavKey::Home,
        KeyCode::End => NavKey::End,
        _ => return None,
    };
    Some(KeyInput::new(nav, modifiers(key.modifiers)))
}

fn modifiers(mods: KeyModifiers) -> Modifiers {
    Modifiers {
        alt: mods.contains(KeyModifiers::ALT),
        ctrl: mods.contains(KeyModifiers::CONTROL),
        shift: mods.contains(KeyModifiers::SHIFT),
        meta: mods.intersects(KeyModifiers::META | KeyModifiers::SUPER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_bound_keys_win() {
        let keymap = Keymap::default();
        assert_eq!(handle_key_event(press(KeyCode::Char('q'), KeyModifiers::NONE), &keymap), Action::Quit);
        assert_eq!(handle_key_event(press(KeyCode::Down, KeyModifiers::NONE), &keymap), Action::ScrollDown);
        assert_eq!(handle_key_event(press(KeyCode::Esc, KeyModifiers::NONE), &keymap), Action::CloseMenu);
    }

    #[test]
    fn test_modified_arrows_go_to_page() {
        let keymap = Keymap::default();
        let action = handle_key_event(press(KeyCode::Down, KeyModifiers::ALT), &keymap);
        assert_eq!(
            action,
            Action::PageKey(KeyInput::new(
                NavKey::ArrowDown,
                Modifiers {
                    alt: true,
                    ..Modifiers::NONE
                }
            ))
        );

        // plain Home is not bound, the page decides whether it means anything
        let action = handle_key_event(press(KeyCode::Home, KeyModifiers::NONE), &keymap);
        assert_eq!(action, Action::PageKey(KeyInput::new(NavKey::Home, Modifiers::NONE)));
    }

    #[test]
    fn test_unbound_keys() {
        let keymap = Keymap::default();
        assert_eq!(handle_key_event(press(KeyCode::Char('x'), KeyModifiers::NONE), &keymap), Action::None);
        assert_eq!(key_input(&press(KeyCode::Left, KeyModifiers::ALT)), None);
    }

    #[test]
    fn test_modifier_translation() {
        let input = key_input(&press(KeyCode::End, KeyModifiers::CONTROL | KeyModifiers::SHIFT)).unwrap();
        assert!(input.modifiers.ctrl);
        assert!(input.modifiers.shift);
        assert!(!input.modifiers.alt);
        assert!(!input.modifiers.meta);
    }
}
