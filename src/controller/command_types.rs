/// Editing mode. Exactly one is active per surface; it decides how every
/// keystroke is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Visual,
}

/// An incomplete two-key sequence. At most one is pending at a time; the
/// next key completes or cancels it, and every mode transition resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingKey {
    #[default]
    None,
    /// `space` leader in Normal mode.
    LeaderSpace,
    /// `g` awaiting `gg`.
    PrefixG,
    /// `d` awaiting a delete motion.
    PrefixD,
    /// `y` awaiting `yy`.
    PrefixY,
    /// `space` leader in Visual mode.
    VisualLeaderSpace,
}

/// Which AI feature a leader sequence asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiKind {
    Discuss,
    Review,
    Polish,
}

/// Typed command emitted to the host application. Fire-and-forget: the
/// controller never sees a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    EnterAiMode {
        kind: AiKind,
        payload: Option<String>,
    },
    NewSession,
    BrowseFiles,
    ToggleSidebar,
    SwitchPane,
    FocusTitle,
    BlurTitle,
    Quit,
    Reset,
}

/// One classified keystroke: exactly one buffer primitive, mode entry, or
/// host emission. Produced by the key handler, executed by the mode
/// controllers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Motions (Visual passes an extend flag through to the buffer)
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    WordForward,
    WordBackward,
    LineHome,
    VisualLineHome,
    LineEnd,
    BufferHome,
    BufferEnd,

    // Insert-mode entries
    EnterInsert,
    EnterInsertAtLineHome,
    EnterInsertAfter,
    EnterInsertAtLineEnd,
    OpenLineBelow,
    OpenLineAbove,
    EnterVisual,

    // Normal-mode edits
    DeleteChar,
    SubstituteChar,
    DeleteToLineEnd,
    ChangeToLineEnd,
    DeleteLine,
    DeleteWordForward,
    DeleteWordBackward,
    DeleteToLineStart,
    YankLine,
    Paste,
    Undo,
    Redo,

    // Insert-mode passthrough
    ExitInsert,
    InsertChar(char),
    InsertNewline,
    InsertTab,
    InsertBackspace,

    // Visual-mode terminals
    VisualYank,
    VisualPaste,
    VisualDelete,
    VisualChange,
    ExitVisual,
    /// Completed Visual leader sequence; `None` means the completion key had
    /// no binding. Either way the surface returns to Normal.
    VisualLeader(Option<AiKind>),

    // Title-surface
    TitleBlur,
    TitleEnterInsert,
    TitleEscape,

    // Host emission
    Host(HostCommand),
}
