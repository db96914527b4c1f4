//! wizard::keys
//!
//! Terminal key events to wizard actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::{Action, InputMode};
use crate::rebase::RebaseOp;

/// Map a key press to an action for the current input mode.
pub fn map_key(key: KeyEvent, mode: InputMode) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Cancel);
    }

    match mode {
        InputMode::List => match key.code {
            KeyCode::Up if shift => Some(Action::MoveUp),
            KeyCode::Down if shift => Some(Action::MoveDown),
            KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
            KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
            KeyCode::Char('K') => Some(Action::MoveUp),
            KeyCode::Char('J') => Some(Action::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::Left),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::Right),
            KeyCode::Tab => Some(Action::CycleOp),
            KeyCode::Char('p') => Some(Action::SetOp(RebaseOp::Pick)),
            KeyCode::Char('s') => Some(Action::SetOp(RebaseOp::Squash)),
            KeyCode::Char('r') => Some(Action::SetOp(RebaseOp::Reword)),
            KeyCode::Char('d') => Some(Action::SetOp(RebaseOp::Drop)),
            KeyCode::Char('e') => Some(Action::Edit),
            KeyCode::Char('m') => Some(Action::LoadMore),
            KeyCode::Char('b') | KeyCode::Backspace => Some(Action::Back),
            KeyCode::Enter | KeyCode::Char('y') => Some(Action::Select),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('n') => Some(Action::Escape),
            _ => None,
        },
        InputMode::Text { multiline } => match key.code {
            KeyCode::Esc => Some(Action::Escape),
            KeyCode::Char('s') if ctrl => Some(Action::Save),
            KeyCode::Enter if multiline => Some(Action::Newline),
            KeyCode::Enter => Some(Action::Save),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Delete => Some(Action::Delete),
            KeyCode::Left => Some(Action::Left),
            KeyCode::Right => Some(Action::Right),
            KeyCode::Home => Some(Action::Home),
            KeyCode::End => Some(Action::End),
            KeyCode::Char(c) if !ctrl => Some(Action::Insert(c)),
            _ => None,
        },
    }
}

/// Key hints for the footer.
pub fn hints(step: &str, mode: InputMode) -> &'static str {
    match mode {
        InputMode::Text { multiline: true } => "ctrl-s save · enter newline · esc discard",
        InputMode::Text { multiline: false } => "enter save · esc discard",
        InputMode::List => match step {
            "select" => "↑/↓ move · m more · enter choose · q quit",
            "push-warning" => "y continue · b back · q quit",
            "edit" => "tab cycle · p/s/r/d set · e edit · shift-↑/↓ reorder · enter continue · b back · q quit",
            "confirm" => "←/→ choose · enter confirm · b back · q quit",
            _ => "",
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    const TEXT: InputMode = InputMode::Text { multiline: false };
    const MULTI: InputMode = InputMode::Text { multiline: true };

    #[test]
    fn ctrl_c_cancels_everywhere() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        for mode in [InputMode::List, TEXT, MULTI] {
            assert_eq!(map_key(ctrl_c, mode), Some(Action::Cancel));
        }
    }

    #[test]
    fn list_bindings() {
        assert_eq!(map_key(key(KeyCode::Tab), InputMode::List), Some(Action::CycleOp));
        assert_eq!(
            map_key(key(KeyCode::Char('s')), InputMode::List),
            Some(Action::SetOp(RebaseOp::Squash))
        );
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Up, KeyModifiers::SHIFT), InputMode::List),
            Some(Action::MoveUp)
        );
        assert_eq!(map_key(key(KeyCode::Up), InputMode::List), Some(Action::Up));
        assert_eq!(map_key(key(KeyCode::Char('q')), InputMode::List), Some(Action::Escape));
        assert_eq!(map_key(key(KeyCode::F(1)), InputMode::List), None);
    }

    #[test]
    fn letters_are_text_in_editors() {
        assert_eq!(map_key(key(KeyCode::Char('q')), TEXT), Some(Action::Insert('q')));
        assert_eq!(map_key(key(KeyCode::Esc), TEXT), Some(Action::Escape));
    }

    #[test]
    fn enter_saves_single_line_but_breaks_multi_line() {
        assert_eq!(map_key(key(KeyCode::Enter), TEXT), Some(Action::Save));
        assert_eq!(map_key(key(KeyCode::Enter), MULTI), Some(Action::Newline));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), MULTI),
            Some(Action::Save)
        );
    }
}
