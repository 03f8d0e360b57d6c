use crate::controller::command_types::{Command, HostCommand, Mode, PendingKey};
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedState};
use crossterm::event::KeyEvent;

/// Visual mode: motions extend the selection, terminal actions consume it
/// and drop back to Normal (or Insert for `c`).
pub struct VisualController;

impl VisualController {
    pub fn new() -> Self {
        Self
    }
}

impl ModeController for VisualController {
    fn handle_key(
        &mut self,
        key_event: &KeyEvent,
        pending: &mut PendingKey,
        shared: &mut SharedState,
    ) -> ModeTransition {
        let Some(command) = KeyHandler::parse_visual(key_event, pending) else {
            return ModeTransition::Stay;
        };

        match command {
            // Motions extend the selection
            Command::MoveLeft => shared.buffer.move_left(true),
            Command::MoveRight => shared.buffer.move_right(true),
            Command::MoveUp => shared.buffer.move_up(true),
            Command::MoveDown => shared.buffer.move_down(true),
            Command::WordForward => shared.buffer.word_forward(true),
            Command::WordBackward => shared.buffer.word_backward(true),
            Command::LineHome => shared.buffer.line_home(true),
            Command::VisualLineHome => shared.buffer.visual_line_home(true),
            Command::LineEnd => shared.buffer.line_end(true),
            Command::BufferEnd => shared.buffer.buffer_end(true),

            Command::VisualYank => {
                if let Some(text) = shared.buffer.selected_text() {
                    shared.yank.store(text);
                }
                return ModeTransition::ToMode(Mode::Normal);
            }
            Command::VisualPaste => {
                if !shared.yank.is_empty() {
                    // insert_text consumes the selection itself, so the
                    // replacement is a single buffer call and one undo step.
                    let text = shared.yank.content().to_string();
                    shared.buffer.insert_text(&text);
                }
                return ModeTransition::ToMode(Mode::Normal);
            }
            Command::VisualDelete => {
                if let Some(text) = shared.buffer.selected_text() {
                    shared.yank.store(text);
                }
                shared.buffer.delete_char();
                return ModeTransition::ToMode(Mode::Normal);
            }
            Command::VisualChange => {
                if let Some(text) = shared.buffer.selected_text() {
                    shared.yank.store(text);
                }
                shared.buffer.delete_char();
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::ExitVisual => return ModeTransition::ToMode(Mode::Normal),

            Command::VisualLeader(kind) => {
                if let Some(kind) = kind {
                    if let Some(selected) = shared.buffer.selected_text() {
                        shared.emit(HostCommand::EnterAiMode {
                            kind,
                            payload: Some(selected),
                        });
                    }
                }
                // Leader completion always abandons Visual, matched or not.
                return ModeTransition::ToMode(Mode::Normal);
            }

            _ => {}
        }

        ModeTransition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::command_types::AiKind;
    use crate::document_model::TextBuffer;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn shared_with_selection(text: &str, chars: usize) -> SharedState {
        let mut state = SharedState::new();
        state.buffer = TextBuffer::from_text(text);
        state.buffer.start_selection();
        for _ in 0..chars {
            state.buffer.move_right(true);
        }
        state
    }

    fn press(state: &mut SharedState, pending: &mut PendingKey, c: char) -> ModeTransition {
        let mut controller = VisualController::new();
        let event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        controller.handle_key(&event, pending, state)
    }

    #[test]
    fn test_yank_copies_without_mutating() {
        let mut state = shared_with_selection("hello world", 5);
        let mut pending = PendingKey::None;

        let transition = press(&mut state, &mut pending, 'y');
        assert_eq!(transition, ModeTransition::ToMode(Mode::Normal));
        assert_eq!(state.yank.content(), "hello");
        assert_eq!(state.buffer.plain_text(), "hello world");
    }

    #[test]
    fn test_delete_captures_then_removes() {
        let mut state = shared_with_selection("hello world", 6);
        let mut pending = PendingKey::None;

        let transition = press(&mut state, &mut pending, 'd');
        assert_eq!(transition, ModeTransition::ToMode(Mode::Normal));
        assert_eq!(state.yank.content(), "hello ");
        assert_eq!(state.buffer.plain_text(), "world");
    }

    #[test]
    fn test_change_enters_insert_instead_of_normal() {
        let mut state = shared_with_selection("hello world", 6);
        let mut pending = PendingKey::None;

        let transition = press(&mut state, &mut pending, 'c');
        assert_eq!(transition, ModeTransition::ToMode(Mode::Insert));
        assert_eq!(state.yank.content(), "hello ");
        assert_eq!(state.buffer.plain_text(), "world");
    }

    #[test]
    fn test_paste_replaces_selection() {
        let mut state = shared_with_selection("abc def", 3);
        let mut pending = PendingKey::None;
        state.yank.store("XY".to_string());

        press(&mut state, &mut pending, 'p');
        assert_eq!(state.buffer.plain_text(), "XY def");
    }

    #[test]
    fn test_escape_abandons_without_touching_register() {
        let mut state = shared_with_selection("hello", 3);
        let mut pending = PendingKey::None;
        state.yank.store("before".to_string());

        let event = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let mut controller = VisualController::new();
        let transition = controller.handle_key(&event, &mut pending, &mut state);

        assert_eq!(transition, ModeTransition::ToMode(Mode::Normal));
        assert_eq!(state.yank.content(), "before");
        assert_eq!(state.buffer.plain_text(), "hello");
    }

    #[test]
    fn test_leader_r_emits_review_with_selection_payload() {
        let mut state = shared_with_selection("selected text", 8);
        let mut pending = PendingKey::None;

        press(&mut state, &mut pending, ' ');
        assert_eq!(pending, PendingKey::VisualLeaderSpace);
        let transition = press(&mut state, &mut pending, 'r');

        assert_eq!(transition, ModeTransition::ToMode(Mode::Normal));
        assert_eq!(
            state.drain_commands(),
            vec![HostCommand::EnterAiMode {
                kind: AiKind::Review,
                payload: Some("selected".to_string()),
            }]
        );
    }

    #[test]
    fn test_leader_without_selection_emits_nothing_but_exits() {
        let mut state = SharedState::new();
        state.buffer = TextBuffer::from_text("text");
        state.buffer.start_selection(); // anchored, zero-width
        let mut pending = PendingKey::None;

        press(&mut state, &mut pending, ' ');
        let transition = press(&mut state, &mut pending, 'p');

        assert_eq!(transition, ModeTransition::ToMode(Mode::Normal));
        assert!(state.drain_commands().is_empty());
    }

    #[test]
    fn test_motions_extend_selection() {
        let mut state = SharedState::new();
        state.buffer = TextBuffer::from_text("one two three");
        state.buffer.start_selection();
        let mut pending = PendingKey::None;

        press(&mut state, &mut pending, 'w');
        press(&mut state, &mut pending, 'w');
        assert_eq!(state.buffer.selected_text().as_deref(), Some("one two "));
    }
}
