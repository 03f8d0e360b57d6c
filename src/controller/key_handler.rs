use crate::controller::command_types::{AiKind, Command, HostCommand, Mode, PendingKey};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Stateful keystroke classifier.
///
/// Given the current mode and pending-sequence state, maps one key event to
/// at most one `Command`. Pending prefixes are consulted before the
/// single-key tables and always clear themselves on the next key - an
/// unmatched completion is silently dropped, never an error.
pub struct KeyHandler;

impl KeyHandler {
    pub fn parse_normal(key: &KeyEvent, pending: &mut PendingKey) -> Option<Command> {
        let code = key.code;
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // A pending prefix fully determines this dispatch.
        match std::mem::take(pending) {
            PendingKey::LeaderSpace => {
                return match code {
                    KeyCode::Char('d') => Some(Command::Host(HostCommand::EnterAiMode {
                        kind: AiKind::Discuss,
                        payload: None,
                    })),
                    KeyCode::Char('r') => Some(Command::Host(HostCommand::EnterAiMode {
                        kind: AiKind::Review,
                        payload: None,
                    })),
                    KeyCode::Char('p') => Some(Command::Host(HostCommand::EnterAiMode {
                        kind: AiKind::Polish,
                        payload: None,
                    })),
                    KeyCode::Char('n') => Some(Command::Host(HostCommand::NewSession)),
                    KeyCode::Char('b') => Some(Command::Host(HostCommand::BrowseFiles)),
                    _ => None,
                };
            }
            PendingKey::PrefixG => {
                return match code {
                    KeyCode::Char('g') => Some(Command::BufferHome),
                    _ => None,
                };
            }
            PendingKey::PrefixD => {
                return match code {
                    KeyCode::Char('d') => Some(Command::DeleteLine),
                    KeyCode::Char('w') | KeyCode::Char('e') => Some(Command::DeleteWordForward),
                    KeyCode::Char('b') => Some(Command::DeleteWordBackward),
                    KeyCode::Char('$') => Some(Command::DeleteToLineEnd),
                    KeyCode::Char('0') => Some(Command::DeleteToLineStart),
                    _ => None,
                };
            }
            PendingKey::PrefixY => {
                return match code {
                    KeyCode::Char('y') => Some(Command::YankLine),
                    _ => None,
                };
            }
            PendingKey::VisualLeaderSpace | PendingKey::None => {}
        }

        // Control chords before plain keys.
        if ctrl {
            return match code {
                KeyCode::Char('r') => Some(Command::Redo),
                KeyCode::Char('b') => Some(Command::Host(HostCommand::ToggleSidebar)),
                _ => None,
            };
        }

        match code {
            // Motions
            KeyCode::Char('h') => Some(Command::MoveLeft),
            KeyCode::Char('l') => Some(Command::MoveRight),
            KeyCode::Char('j') => Some(Command::MoveDown),
            KeyCode::Char('k') => Some(Command::MoveUp),
            KeyCode::Char('w') | KeyCode::Char('e') => Some(Command::WordForward),
            KeyCode::Char('b') => Some(Command::WordBackward),
            KeyCode::Char('0') => Some(Command::LineHome),
            KeyCode::Char('^') => Some(Command::VisualLineHome),
            KeyCode::Char('$') => Some(Command::LineEnd),
            KeyCode::Char('G') => Some(Command::BufferEnd),
            KeyCode::Char('g') => {
                *pending = PendingKey::PrefixG;
                None
            }

            // Insert-mode entries
            KeyCode::Char('i') => Some(Command::EnterInsert),
            KeyCode::Char('I') => Some(Command::EnterInsertAtLineHome),
            KeyCode::Char('a') => Some(Command::EnterInsertAfter),
            KeyCode::Char('A') => Some(Command::EnterInsertAtLineEnd),
            KeyCode::Char('o') => Some(Command::OpenLineBelow),
            KeyCode::Char('O') => Some(Command::OpenLineAbove),
            KeyCode::Char('v') => Some(Command::EnterVisual),

            // Edits
            KeyCode::Char('x') => Some(Command::DeleteChar),
            KeyCode::Char('s') => Some(Command::SubstituteChar),
            KeyCode::Char('D') => Some(Command::DeleteToLineEnd),
            KeyCode::Char('C') => Some(Command::ChangeToLineEnd),
            KeyCode::Char('d') => {
                *pending = PendingKey::PrefixD;
                None
            }
            KeyCode::Char('u') => Some(Command::Undo),

            // Yank / paste
            KeyCode::Char('y') => {
                *pending = PendingKey::PrefixY;
                None
            }
            KeyCode::Char('p') => Some(Command::Paste),

            // Leader
            KeyCode::Char(' ') => {
                *pending = PendingKey::LeaderSpace;
                None
            }

            // Surface / pane control
            KeyCode::Char('T') => Some(Command::Host(HostCommand::FocusTitle)),
            KeyCode::Tab => Some(Command::Host(HostCommand::SwitchPane)),

            // Global
            KeyCode::Char('q') => Some(Command::Host(HostCommand::Quit)),
            KeyCode::Esc => Some(Command::Host(HostCommand::Reset)),

            _ => None,
        }
    }

    pub fn parse_visual(key: &KeyEvent, pending: &mut PendingKey) -> Option<Command> {
        let code = key.code;

        if std::mem::take(pending) == PendingKey::VisualLeaderSpace {
            return Some(match code {
                KeyCode::Char('r') => Command::VisualLeader(Some(AiKind::Review)),
                KeyCode::Char('p') => Command::VisualLeader(Some(AiKind::Polish)),
                _ => Command::VisualLeader(None),
            });
        }

        match code {
            // Motions - the visual controller passes the extend flag through
            KeyCode::Char('h') => Some(Command::MoveLeft),
            KeyCode::Char('l') => Some(Command::MoveRight),
            KeyCode::Char('j') => Some(Command::MoveDown),
            KeyCode::Char('k') => Some(Command::MoveUp),
            KeyCode::Char('w') | KeyCode::Char('e') => Some(Command::WordForward),
            KeyCode::Char('b') => Some(Command::WordBackward),
            KeyCode::Char('0') => Some(Command::LineHome),
            KeyCode::Char('^') => Some(Command::VisualLineHome),
            KeyCode::Char('$') => Some(Command::LineEnd),
            KeyCode::Char('G') => Some(Command::BufferEnd),

            // Terminal actions
            KeyCode::Char('y') => Some(Command::VisualYank),
            KeyCode::Char('p') => Some(Command::VisualPaste),
            KeyCode::Char('d') | KeyCode::Char('x') => Some(Command::VisualDelete),
            KeyCode::Char('c') => Some(Command::VisualChange),
            KeyCode::Esc => Some(Command::ExitVisual),

            KeyCode::Char(' ') => {
                *pending = PendingKey::VisualLeaderSpace;
                None
            }

            _ => None,
        }
    }

    /// Insert mode: everything except escape passes through to the buffer.
    pub fn parse_insert(key: &KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => Some(Command::ExitInsert),
            KeyCode::Enter => Some(Command::InsertNewline),
            KeyCode::Tab => Some(Command::InsertTab),
            KeyCode::Backspace => Some(Command::InsertBackspace),
            KeyCode::Char(c) => Some(Command::InsertChar(c)),
            KeyCode::Left => Some(Command::MoveLeft),
            KeyCode::Right => Some(Command::MoveRight),
            KeyCode::Up => Some(Command::MoveUp),
            KeyCode::Down => Some(Command::MoveDown),
            _ => None,
        }
    }

    /// The title surface's reduced binding table.
    pub fn parse_title(mode: Mode, key: &KeyEvent) -> Option<Command> {
        match mode {
            Mode::Normal => match key.code {
                KeyCode::Char('j') | KeyCode::Enter => Some(Command::TitleBlur),
                KeyCode::Char('i') | KeyCode::Char('a') => Some(Command::TitleEnterInsert),
                KeyCode::Esc => Some(Command::TitleEscape),
                KeyCode::Char('q') => Some(Command::Host(HostCommand::Quit)),
                _ => None,
            },
            Mode::Insert => match key.code {
                KeyCode::Esc => Some(Command::ExitInsert),
                KeyCode::Backspace => Some(Command::InsertBackspace),
                KeyCode::Left => Some(Command::MoveLeft),
                KeyCode::Right => Some(Command::MoveRight),
                KeyCode::Char(c) => Some(Command::InsertChar(c)),
                _ => None,
            },
            // The title surface has no Visual mode.
            Mode::Visual => None,
        }
    }
}
