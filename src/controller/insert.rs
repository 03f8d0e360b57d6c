use crate::controller::command_types::{Command, Mode, PendingKey};
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedState};
use crossterm::event::KeyEvent;

/// Insert mode: everything except escape passes through to the buffer.
pub struct InsertController;

impl InsertController {
    pub fn new() -> Self {
        Self
    }
}

impl ModeController for InsertController {
    fn handle_key(
        &mut self,
        key_event: &KeyEvent,
        _pending: &mut PendingKey,
        shared: &mut SharedState,
    ) -> ModeTransition {
        let Some(command) = KeyHandler::parse_insert(key_event) else {
            return ModeTransition::Stay;
        };

        match command {
            Command::ExitInsert => {
                // Insert must not carry a stale selection back to Normal.
                shared.buffer.reset_selection();
                return ModeTransition::ToMode(Mode::Normal);
            }
            Command::InsertChar(c) => shared.buffer.insert_char(c),
            Command::InsertNewline => shared.buffer.insert_newline(),
            Command::InsertTab => shared.buffer.insert_text("    "),
            Command::InsertBackspace => shared.buffer.delete_char_backward(),
            Command::MoveLeft => shared.buffer.move_left(false),
            Command::MoveRight => shared.buffer.move_right(false),
            Command::MoveUp => shared.buffer.move_up(false),
            Command::MoveDown => shared.buffer.move_down(false),
            _ => {}
        }

        ModeTransition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(state: &mut SharedState, code: KeyCode) -> ModeTransition {
        let mut controller = InsertController::new();
        let mut pending = PendingKey::None;
        let event = KeyEvent::new(code, KeyModifiers::NONE);
        controller.handle_key(&event, &mut pending, state)
    }

    #[test]
    fn test_characters_pass_through() {
        let mut state = SharedState::new();
        press(&mut state, KeyCode::Char('h'));
        press(&mut state, KeyCode::Char('i'));
        assert_eq!(state.buffer.plain_text(), "hi");
    }

    #[test]
    fn test_escape_exits_and_clears_selection() {
        let mut state = SharedState::new();
        state.buffer.insert_char('a');
        state.buffer.start_selection();
        state.buffer.move_left(true);

        let transition = press(&mut state, KeyCode::Esc);
        assert_eq!(transition, ModeTransition::ToMode(Mode::Normal));
        assert!(!state.buffer.has_selection());
    }

    #[test]
    fn test_enter_splits_line() {
        let mut state = SharedState::new();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Enter);
        press(&mut state, KeyCode::Char('b'));
        assert_eq!(state.buffer.plain_text(), "a\nb");
    }

    #[test]
    fn test_backspace() {
        let mut state = SharedState::new();
        press(&mut state, KeyCode::Char('a'));
        press(&mut state, KeyCode::Char('b'));
        press(&mut state, KeyCode::Backspace);
        assert_eq!(state.buffer.plain_text(), "a");
    }
}
