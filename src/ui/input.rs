//! Keystroke routing for the overlay.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a keystroke asks the overlay to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    Confirm,
    Cancel,
    /// Single-line preview scroll.
    ScrollDown,
    ScrollUp,
    /// Half-page preview scroll.
    HalfPageDown,
    HalfPageUp,
    /// Append a character to the query.
    Insert(char),
    /// Delete the last query character.
    DeleteBack,
    Ignored,
}

/// Map a key event to an [`InputAction`].
///
/// Navigation takes the arrow keys plus the Ctrl-P/Ctrl-N chords; preview
/// scrolling uses the Ctrl-E/Ctrl-Y and Ctrl-D/Ctrl-U pairs. Everything
/// else that carries a printable character feeds the query field.
#[must_use]
pub fn dispatch(key: KeyEvent) -> InputAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up => InputAction::MoveUp,
        KeyCode::Down => InputAction::MoveDown,
        KeyCode::Enter => InputAction::Confirm,
        KeyCode::Esc => InputAction::Cancel,
        KeyCode::Backspace => InputAction::DeleteBack,
        KeyCode::Char('p') if ctrl => InputAction::MoveUp,
        KeyCode::Char('n') if ctrl => InputAction::MoveDown,
        KeyCode::Char('e') if ctrl => InputAction::ScrollDown,
        KeyCode::Char('y') if ctrl => InputAction::ScrollUp,
        KeyCode::Char('d') if ctrl => InputAction::HalfPageDown,
        KeyCode::Char('u') if ctrl => InputAction::HalfPageUp,
        KeyCode::Char('c') if ctrl => InputAction::Cancel,
        KeyCode::Char(ch) if !ctrl => InputAction::Insert(ch),
        _ => InputAction::Ignored,
    }
}
