use crate::controller::command_types::{HostCommand, Mode, PendingKey};
use crate::document_model::{TextBuffer, TitleBuffer, YankRegister};
use crossterm::event::KeyEvent;

/// State every mode controller needs: the two focusable buffers, the
/// process-wide yank register, and the outgoing host-command queue.
///
/// The yank register lives here, not in a global: each surface controller
/// reaches it through `&mut SharedState`, which keeps ownership and test
/// isolation explicit while still surviving surface switches.
pub struct SharedState {
    pub buffer: TextBuffer,
    pub title: TitleBuffer,
    pub yank: YankRegister,
    host_commands: Vec<HostCommand>,
}

impl SharedState {
    pub fn new() -> Self {
        Self {
            buffer: TextBuffer::new(),
            title: TitleBuffer::new(),
            yank: YankRegister::new(),
            host_commands: Vec::new(),
        }
    }

    /// Fire-and-forget emission toward the host application.
    pub fn emit(&mut self, command: HostCommand) {
        self.host_commands.push(command);
    }

    /// Hand the queued commands to the host. Called once per keystroke.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.host_commands)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of handling a key event in a mode controller.
#[derive(Debug, PartialEq, Eq)]
pub enum ModeTransition {
    Stay,
    ToMode(Mode),
}

/// Implemented by each per-mode controller of the body surface.
pub trait ModeController {
    fn handle_key(
        &mut self,
        key_event: &KeyEvent,
        pending: &mut PendingKey,
        shared: &mut SharedState,
    ) -> ModeTransition;
}
