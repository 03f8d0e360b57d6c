use crate::controller::command_types::{Command, Mode, PendingKey};
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::SharedState;
use crossterm::event::KeyEvent;

/// Reduced modal controller for the single-line title field.
///
/// Shares the Mode enum and the pending-reset discipline with the body
/// surface but implements no motions, operators, or Visual mode. Its mode
/// is independent of the body surface's.
pub struct TitleController {
    mode: Mode,
    pending: PendingKey,
}

impl TitleController {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            pending: PendingKey::None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The single place this surface's mode changes; resets pending state
    /// unconditionally.
    fn transition_to_mode(&mut self, new_mode: Mode) {
        self.pending = PendingKey::None;
        self.mode = new_mode;
    }

    pub fn handle_key(&mut self, key_event: &KeyEvent, shared: &mut SharedState) {
        let Some(command) = KeyHandler::parse_title(self.mode, key_event) else {
            return;
        };

        match command {
            Command::TitleBlur => {
                shared.emit(crate::controller::command_types::HostCommand::BlurTitle);
            }
            Command::TitleEnterInsert => self.transition_to_mode(Mode::Insert),
            Command::TitleEscape => {
                shared.emit(crate::controller::command_types::HostCommand::BlurTitle);
                self.transition_to_mode(Mode::Normal);
            }
            Command::ExitInsert => self.transition_to_mode(Mode::Normal),
            Command::InsertChar(c) => shared.title.insert_char(c),
            Command::InsertBackspace => shared.title.delete_char_backward(),
            Command::MoveLeft => shared.title.move_left(),
            Command::MoveRight => shared.title.move_right(),
            Command::Host(host) => shared.emit(host),
            _ => {}
        }
    }
}
