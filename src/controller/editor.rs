use crate::controller::command_types::{Mode, PendingKey};
use crate::controller::insert::InsertController;
use crate::controller::normal::NormalController;
use crate::controller::shared_state::{ModeController, ModeTransition, SharedState};
use crate::controller::visual::VisualController;
use crossterm::event::KeyEvent;

/// Modal state machine for the body surface: current mode, pending-sequence
/// state, and the per-mode controllers. One instance lives for the process
/// lifetime; there is no terminal state.
pub struct SurfaceController {
    mode: Mode,
    pending: PendingKey,
    normal: NormalController,
    insert: InsertController,
    visual: VisualController,
}

impl SurfaceController {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            pending: PendingKey::None,
            normal: NormalController::new(),
            insert: InsertController::new(),
            visual: VisualController::new(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn pending(&self) -> PendingKey {
        self.pending
    }

    /// Classify and dispatch one keystroke. At most one buffer-mutating call
    /// happens per invocation; emitted host commands land in `shared`.
    pub fn handle_key(&mut self, key_event: &KeyEvent, shared: &mut SharedState) {
        let transition = match self.mode {
            Mode::Normal => self.normal.handle_key(key_event, &mut self.pending, shared),
            Mode::Insert => self.insert.handle_key(key_event, &mut self.pending, shared),
            Mode::Visual => self.visual.handle_key(key_event, &mut self.pending, shared),
        };

        if let ModeTransition::ToMode(new_mode) = transition {
            self.transition_to_mode(new_mode, shared);
        }
    }

    /// The single entry point for mode changes. Pending state is reset here
    /// unconditionally, leaving Visual always clears the selection, and
    /// Insert sessions are bracketed into one undo group.
    fn transition_to_mode(&mut self, new_mode: Mode, shared: &mut SharedState) {
        self.pending = PendingKey::None;

        if self.mode == Mode::Visual && new_mode != Mode::Visual {
            shared.buffer.reset_selection();
        }
        if self.mode == Mode::Insert && new_mode != Mode::Insert {
            shared.buffer.end_undo_group();
        }

        match new_mode {
            Mode::Visual => shared.buffer.start_selection(),
            Mode::Insert => shared.buffer.begin_undo_group(),
            Mode::Normal => {}
        }

        self.mode = new_mode;
    }
}

impl Default for SurfaceController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::command_types::{AiKind, HostCommand};
    use crate::document_model::TextBuffer;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn setup(text: &str) -> (SurfaceController, SharedState) {
        let mut state = SharedState::new();
        state.buffer = TextBuffer::from_text(text);
        (SurfaceController::new(), state)
    }

    fn press(controller: &mut SurfaceController, state: &mut SharedState, c: char) {
        let event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        controller.handle_key(&event, state);
    }

    fn press_esc(controller: &mut SurfaceController, state: &mut SharedState) {
        let event = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        controller.handle_key(&event, state);
    }

    #[test]
    fn test_initial_state() {
        let controller = SurfaceController::new();
        assert_eq!(controller.mode(), Mode::Normal);
        assert_eq!(controller.pending(), PendingKey::None);
    }

    #[test]
    fn test_mode_transition_resets_pending() {
        let (mut controller, mut state) = setup("text");
        press(&mut controller, &mut state, ' ');
        assert_eq!(controller.pending(), PendingKey::LeaderSpace);
        // An unmatched completion clears pending without a transition.
        press(&mut controller, &mut state, 'z');
        assert_eq!(controller.pending(), PendingKey::None);

        // i enters Insert; pending must be untouched afterwards.
        press(&mut controller, &mut state, 'i');
        assert_eq!(controller.mode(), Mode::Insert);
        assert_eq!(controller.pending(), PendingKey::None);
    }

    #[test]
    fn test_escape_from_insert_returns_to_normal() {
        let (mut controller, mut state) = setup("");
        press(&mut controller, &mut state, 'i');
        press(&mut controller, &mut state, 'x');
        press_esc(&mut controller, &mut state);
        assert_eq!(controller.mode(), Mode::Normal);
        assert_eq!(controller.pending(), PendingKey::None);
        assert_eq!(state.buffer.plain_text(), "x");
    }

    #[test]
    fn test_escape_from_visual_clears_selection() {
        let (mut controller, mut state) = setup("hello");
        press(&mut controller, &mut state, 'v');
        assert_eq!(controller.mode(), Mode::Visual);
        assert!(state.buffer.has_selection());

        press(&mut controller, &mut state, 'l');
        press_esc(&mut controller, &mut state);
        assert_eq!(controller.mode(), Mode::Normal);
        assert!(!state.buffer.has_selection());
    }

    #[test]
    fn test_visual_extend_then_delete_full_flow() {
        let (mut controller, mut state) = setup("hello world");
        press(&mut controller, &mut state, 'v');
        for _ in 0..6 {
            press(&mut controller, &mut state, 'l');
        }
        press(&mut controller, &mut state, 'd');

        assert_eq!(controller.mode(), Mode::Normal);
        assert_eq!(state.yank.content(), "hello ");
        assert_eq!(state.buffer.plain_text(), "world");
        assert!(!state.buffer.has_selection());
    }

    #[test]
    fn test_visual_change_lands_in_insert() {
        let (mut controller, mut state) = setup("hello");
        press(&mut controller, &mut state, 'v');
        press(&mut controller, &mut state, 'l');
        press(&mut controller, &mut state, 'l');
        press(&mut controller, &mut state, 'c');

        assert_eq!(controller.mode(), Mode::Insert);
        assert_eq!(state.yank.content(), "he");
        assert_eq!(state.buffer.plain_text(), "llo");
    }

    #[test]
    fn test_visual_leader_review_carries_selection_and_forces_normal() {
        let (mut controller, mut state) = setup("pick me up");
        press(&mut controller, &mut state, 'v');
        for _ in 0..4 {
            press(&mut controller, &mut state, 'l');
        }
        press(&mut controller, &mut state, ' ');
        press(&mut controller, &mut state, 'r');

        assert_eq!(controller.mode(), Mode::Normal);
        assert_eq!(
            state.drain_commands(),
            vec![HostCommand::EnterAiMode {
                kind: AiKind::Review,
                payload: Some("pick".to_string()),
            }]
        );
    }

    #[test]
    fn test_visual_paste_over_selection_is_one_undo_step() {
        let (mut controller, mut state) = setup("old text");
        press(&mut controller, &mut state, 'y');
        press(&mut controller, &mut state, 'y');

        press(&mut controller, &mut state, 'v');
        for _ in 0..3 {
            press(&mut controller, &mut state, 'l');
        }
        press(&mut controller, &mut state, 'p');
        assert_eq!(controller.mode(), Mode::Normal);
        assert_eq!(state.buffer.plain_text(), "old text\n text");

        // A single undo restores the pre-paste buffer.
        press(&mut controller, &mut state, 'u');
        assert_eq!(state.buffer.plain_text(), "old text");
    }

    #[test]
    fn test_insert_session_is_one_undo_step() {
        let (mut controller, mut state) = setup("");
        press(&mut controller, &mut state, 'i');
        for c in "typed".chars() {
            press(&mut controller, &mut state, c);
        }
        press_esc(&mut controller, &mut state);
        assert_eq!(state.buffer.plain_text(), "typed");

        press(&mut controller, &mut state, 'u');
        assert!(state.buffer.is_empty());
    }

    #[test]
    fn test_open_line_below_enters_insert_on_new_line() {
        let (mut controller, mut state) = setup("first");
        press(&mut controller, &mut state, 'o');
        assert_eq!(controller.mode(), Mode::Insert);
        assert_eq!(state.buffer.cursor(), (1, 0));
        press(&mut controller, &mut state, 'x');
        assert_eq!(state.buffer.plain_text(), "first\nx");
    }

    #[test]
    fn test_open_line_above() {
        let (mut controller, mut state) = setup("below");
        press(&mut controller, &mut state, 'O');
        assert_eq!(controller.mode(), Mode::Insert);
        assert_eq!(state.buffer.cursor(), (0, 0));
        press(&mut controller, &mut state, 'x');
        assert_eq!(state.buffer.plain_text(), "x\nbelow");
    }

    #[test]
    fn test_register_survives_mode_changes() {
        let (mut controller, mut state) = setup("line one");
        press(&mut controller, &mut state, 'y');
        press(&mut controller, &mut state, 'y');
        press(&mut controller, &mut state, 'i');
        press_esc(&mut controller, &mut state);
        press(&mut controller, &mut state, 'v');
        press_esc(&mut controller, &mut state);
        assert_eq!(state.yank.content(), "line one\n");
    }
}
