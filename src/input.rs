//! Key bindings: arrows, WASD and vim-style.

use crate::repeat::Direction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Rotate,
    Hold,
    HardDrop,
    ToggleGhost,
    NewGame,
    Pause,
    Quit,
    None,
}

impl Action {
    /// Held-key direction, for the auto-repeat scheduler.
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Move(d) => Some(d),
            _ => None,
        }
    }
}

/// Map key event to game action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Char('n' | 'N' | 'r' | 'R') | KeyCode::Enter => Action::NewGame,
        KeyCode::Char('g' | 'G') => Action::ToggleGhost,
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h') => Action::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l') => Action::Move(Direction::Right),
        KeyCode::Down | KeyCode::Char('s' | 'S' | 'j') => Action::Move(Direction::Down),
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k' | 'x' | 'X') => Action::Rotate,
        KeyCode::Char('c' | 'C') => Action::Hold,
        KeyCode::Char(' ') => Action::HardDrop,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn movement_keys() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::Move(Direction::Left));
        assert_eq!(key_to_action(key(KeyCode::Char('a'))), Action::Move(Direction::Left));
        assert_eq!(key_to_action(key(KeyCode::Char('l'))), Action::Move(Direction::Right));
        assert_eq!(key_to_action(key(KeyCode::Char('s'))), Action::Move(Direction::Down));
    }

    #[test]
    fn edge_triggered_keys() {
        assert_eq!(key_to_action(key(KeyCode::Char('w'))), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char('c'))), Action::Hold);
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::HardDrop);
        assert_eq!(key_to_action(key(KeyCode::Char('g'))), Action::ToggleGhost);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::NewGame);
        assert!(key_to_action(key(KeyCode::Char('w'))).direction().is_none());
    }

    #[test]
    fn shift_is_ignored_but_alt_is_not() {
        let shifted = KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(shifted), Action::Move(Direction::Right));
        let alt = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::ALT);
        assert_eq!(key_to_action(alt), Action::None);
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ev), Action::Quit);
    }

    #[test]
    fn release_events_map_like_presses() {
        let ev = KeyEvent::new_with_kind(KeyCode::Left, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(key_to_action(ev).direction(), Some(Direction::Left));
    }
}
