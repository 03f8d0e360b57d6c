/// Modal editing controller - interprets keystrokes into buffer operations,
/// mode transitions, and host commands.
pub mod command_types;
pub mod editor;
pub mod insert;
pub mod key_handler;
pub mod normal;
pub mod shared_state;
pub mod title;
pub mod visual;

pub use command_types::{AiKind, HostCommand, Mode, PendingKey};
pub use editor::SurfaceController;
pub use shared_state::{ModeController, ModeTransition, SharedState};
pub use title::TitleController;
