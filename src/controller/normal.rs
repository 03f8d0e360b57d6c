use crate::controller::command_types::{Command, HostCommand, Mode, PendingKey};
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedState};
use crossterm::event::KeyEvent;

/// Normal mode: navigation, operators, leader sequences. Never inserts
/// characters directly.
pub struct NormalController;

impl NormalController {
    pub fn new() -> Self {
        Self
    }
}

impl ModeController for NormalController {
    fn handle_key(
        &mut self,
        key_event: &KeyEvent,
        pending: &mut PendingKey,
        shared: &mut SharedState,
    ) -> ModeTransition {
        let Some(command) = KeyHandler::parse_normal(key_event, pending) else {
            return ModeTransition::Stay;
        };

        match command {
            // Motions
            Command::MoveLeft => shared.buffer.move_left(false),
            Command::MoveRight => shared.buffer.move_right(false),
            Command::MoveDown => shared.buffer.move_down(false),
            Command::MoveUp => {
                // `k` on the top row moves focus up out of the buffer into
                // the title field instead of moving the cursor.
                if shared.buffer.cursor().0 == 0 {
                    shared.emit(HostCommand::FocusTitle);
                } else {
                    shared.buffer.move_up(false);
                }
            }
            Command::WordForward => shared.buffer.word_forward(false),
            Command::WordBackward => shared.buffer.word_backward(false),
            Command::LineHome => shared.buffer.line_home(false),
            Command::VisualLineHome => shared.buffer.visual_line_home(false),
            Command::LineEnd => shared.buffer.line_end(false),
            Command::BufferHome => shared.buffer.buffer_home(false),
            Command::BufferEnd => shared.buffer.buffer_end(false),

            // Insert-mode entries
            Command::EnterInsert => return ModeTransition::ToMode(Mode::Insert),
            Command::EnterInsertAtLineHome => {
                shared.buffer.line_home(false);
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::EnterInsertAfter => {
                shared.buffer.move_right(false);
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::EnterInsertAtLineEnd => {
                shared.buffer.line_end(false);
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::OpenLineBelow => {
                shared.buffer.line_end(false);
                shared.buffer.insert_newline();
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::OpenLineAbove => {
                shared.buffer.line_home(false);
                shared.buffer.insert_newline();
                shared.buffer.move_up(false);
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::EnterVisual => return ModeTransition::ToMode(Mode::Visual),

            // Immediate edits
            Command::DeleteChar => {
                shared.buffer.delete_char();
            }
            Command::SubstituteChar => {
                shared.buffer.delete_char();
                return ModeTransition::ToMode(Mode::Insert);
            }
            Command::DeleteToLineEnd => {
                let removed = shared.buffer.delete_to_line_end();
                shared.yank.store_if_nonempty(removed);
            }
            Command::ChangeToLineEnd => {
                let removed = shared.buffer.delete_to_line_end();
                shared.yank.store_if_nonempty(removed);
                return ModeTransition::ToMode(Mode::Insert);
            }

            // Operator completions
            Command::DeleteLine => {
                let removed = shared.buffer.delete_line();
                shared.yank.store(removed);
            }
            Command::DeleteWordForward => {
                let removed = shared.buffer.delete_word_forward();
                shared.yank.store_if_nonempty(removed);
            }
            Command::DeleteWordBackward => {
                let removed = shared.buffer.delete_word_backward();
                shared.yank.store_if_nonempty(removed);
            }
            Command::DeleteToLineStart => {
                let removed = shared.buffer.delete_to_line_start();
                shared.yank.store_if_nonempty(removed);
            }
            Command::YankLine => {
                let row = shared.buffer.cursor().0;
                if let Some(line) = shared.buffer.line(row) {
                    shared.yank.store(format!("{}\n", line));
                }
            }
            Command::Paste => {
                if !shared.yank.is_empty() {
                    let text = shared.yank.content().to_string();
                    shared.buffer.insert_text(&text);
                }
            }

            // History
            Command::Undo => shared.buffer.undo(),
            Command::Redo => shared.buffer.redo(),

            // Host emission
            Command::Host(host) => shared.emit(host),

            // Not producible by the Normal-mode classifier.
            _ => {}
        }

        ModeTransition::Stay
    }
}
