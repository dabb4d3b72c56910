use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::selector::MenuInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Menu(MenuInput),
    CopyKey,
    /// Ctrl+C: leave the menu from any mode.
    Interrupt,
    Ignore,
}

pub fn action_for(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Interrupt,
            _ => Action::Ignore,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Action::Menu(MenuInput::Up),
        KeyCode::Down | KeyCode::Char('j') => Action::Menu(MenuInput::Down),
        KeyCode::PageUp => Action::Menu(MenuInput::PageUp),
        KeyCode::PageDown => Action::Menu(MenuInput::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Action::Menu(MenuInput::Home),
        KeyCode::End | KeyCode::Char('G') => Action::Menu(MenuInput::End),
        KeyCode::Enter => Action::Menu(MenuInput::Confirm),
        KeyCode::Esc | KeyCode::Char('q') => Action::Menu(MenuInput::Cancel),
        KeyCode::Char('c') => Action::CopyKey,
        _ => Action::Ignore,
    }
}
