//! Host application: owns the surfaces, screens, AI sessions, and the
//! terminal event loop. Controllers never see any of this; they talk to it
//! through the host-command queue drained here after every keystroke.

pub mod browser;
pub mod chat;
pub mod idle;
pub mod stats;

pub use browser::{BrowserAction, FileBrowser};
pub use chat::{ChatRole, ChatState};
pub use idle::{IdleTracker, WhisperNote};
pub use stats::TypingStats;

use crate::ai::{AiClient, AiEvent, AiHandle, DiscussSession, WhisperGate};
use crate::ai::{run_polish, run_review, run_whisper};
use crate::config::RcConfig;
use crate::controller::{AiKind, HostCommand, Mode, SharedState, SurfaceController, TitleController};
use crate::document_model::TextBuffer;
use crate::store::Store;
use crate::view::Renderer;
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Editor,
    Browser,
}

/// Which surface receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Body,
    Title,
    Chat,
    Sidebar,
}

enum StreamTarget {
    Chat,
    PaneOutput,
    Whisper,
}

struct ActiveStream {
    handle: AiHandle,
    target: StreamTarget,
}

pub struct App {
    pub shared: SharedState,
    pub surface: SurfaceController,
    pub title_controller: TitleController,
    pub screen: Screen,
    pub focus: Focus,
    pub browser: FileBrowser,
    pub sidebar: Option<FileBrowser>,
    pub ai_pane: Option<AiKind>,
    pub pane_output: String,
    pub chat: ChatState,
    pub stats: TypingStats,
    pub whisper: Option<WhisperNote>,
    discuss: DiscussSession,
    idle: IdleTracker,
    whisper_gate: WhisperGate,
    client: Option<AiClient>,
    stream: Option<ActiveStream>,
    store: Store,
    current_path: Option<PathBuf>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &RcConfig) -> Result<Self> {
        let store = match &config.writings_dir {
            Some(dir) => Store::new(dir.clone())?,
            None => Store::open_default()?,
        };

        let client = if config.ai_enabled {
            match AiClient::new(&config.model) {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::warn!("ai disabled: {err}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            shared: SharedState::new(),
            surface: SurfaceController::new(),
            title_controller: TitleController::new(),
            screen: Screen::Editor,
            focus: Focus::Body,
            browser: FileBrowser::new(),
            sidebar: None,
            ai_pane: None,
            pane_output: String::new(),
            chat: ChatState::new(),
            stats: TypingStats::new(),
            whisper: None,
            discuss: DiscussSession::new(),
            idle: IdleTracker::new(config.idle_timeout),
            whisper_gate: WhisperGate::new(config.whisper_rate_limit),
            client,
            stream: None,
            store,
            current_path: None,
            should_quit: false,
        })
    }

    /// Open an existing draft at startup.
    pub fn open(&mut self, path: &std::path::Path) -> Result<()> {
        self.load_draft(path.to_path_buf())
    }

    /// Terminal event loop. Draws, waits up to the poll interval for a key,
    /// and drains AI stream events between keystrokes.
    pub fn run(&mut self) -> Result<()> {
        let mut renderer = Renderer::new()?;
        loop {
            self.tick();
            renderer.draw(self)?;

            if event::poll(POLL_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key(&key);
                    }
                    _ => {}
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    /// Per-frame housekeeping: stream events, whisper expiry, idle trigger.
    fn tick(&mut self) {
        self.pump_stream();
        if self.whisper.as_ref().is_some_and(|w| w.is_expired()) {
            self.whisper = None;
        }
        self.maybe_whisper();
    }

    pub fn handle_key(&mut self, key_event: &KeyEvent) {
        self.idle.record_activity();
        self.whisper = None;

        if self.screen == Screen::Browser {
            self.handle_browser_key(key_event);
            return;
        }

        match self.focus {
            Focus::Sidebar => self.handle_sidebar_key(key_event),
            Focus::Chat => self.handle_chat_key(key_event),
            Focus::Title => {
                self.title_controller.handle_key(key_event, &mut self.shared);
                self.apply_host_commands();
            }
            Focus::Body => {
                let was_insert = self.surface.mode() == Mode::Insert;
                if was_insert
                    && matches!(key_event.code, KeyCode::Char(_) | KeyCode::Enter | KeyCode::Tab)
                {
                    self.stats.record_char();
                }

                self.surface.handle_key(key_event, &mut self.shared);

                let is_insert = self.surface.mode() == Mode::Insert;
                if !was_insert && is_insert {
                    self.stats.enter_insert();
                } else if was_insert && !is_insert {
                    self.stats.leave_insert();
                }

                self.apply_host_commands();
            }
        }
    }

    fn handle_browser_key(&mut self, key_event: &KeyEvent) {
        let Some(action) = self.browser.handle_key(key_event) else {
            return;
        };
        match action {
            BrowserAction::Open(path) => {
                if let Err(err) = self.load_draft(path) {
                    tracing::warn!("failed to load draft: {err}");
                }
            }
            BrowserAction::NewDraft => self.new_session(),
            BrowserAction::Delete(path) => {
                if let Err(err) = self.store.delete(&path) {
                    tracing::warn!("failed to delete draft: {err}");
                }
                self.browser.set_drafts(self.store.list());
            }
            BrowserAction::Close => self.screen = Screen::Editor,
            BrowserAction::Quit => self.quit(),
        }
    }

    fn handle_sidebar_key(&mut self, key_event: &KeyEvent) {
        use crossterm::event::KeyModifiers;
        let close = key_event.code == KeyCode::Esc
            || (key_event.code == KeyCode::Char('b')
                && key_event.modifiers.contains(KeyModifiers::CONTROL));
        if close {
            self.sidebar = None;
            self.focus = Focus::Body;
            return;
        }

        let Some(sidebar) = self.sidebar.as_mut() else {
            return;
        };
        let Some(action) = sidebar.handle_key(key_event) else {
            return;
        };
        match action {
            BrowserAction::Open(path) => {
                self.sidebar = None;
                self.focus = Focus::Body;
                if let Err(err) = self.load_draft(path) {
                    tracing::warn!("failed to load draft: {err}");
                }
            }
            BrowserAction::NewDraft => {
                self.sidebar = None;
                self.new_session();
            }
            BrowserAction::Delete(path) => {
                if let Err(err) = self.store.delete(&path) {
                    tracing::warn!("failed to delete draft: {err}");
                }
                if let Some(sidebar) = self.sidebar.as_mut() {
                    sidebar.set_drafts(self.store.list());
                }
            }
            BrowserAction::Close => {
                self.sidebar = None;
                self.focus = Focus::Body;
            }
            BrowserAction::Quit => self.quit(),
        }
    }

    fn handle_chat_key(&mut self, key_event: &KeyEvent) {
        match key_event.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Body,
            KeyCode::Enter => self.submit_chat(),
            KeyCode::Backspace => {
                self.chat.input.pop();
            }
            KeyCode::Char(c) => self.chat.input.push(c),
            _ => {}
        }
    }

    fn apply_host_commands(&mut self) {
        for command in self.shared.drain_commands() {
            tracing::debug!(?command, "host command");
            match command {
                HostCommand::EnterAiMode { kind, payload } => self.enter_ai_mode(kind, payload),
                HostCommand::NewSession => self.new_session(),
                HostCommand::BrowseFiles => {
                    self.save_current();
                    self.browser.set_drafts(self.store.list());
                    self.screen = Screen::Browser;
                }
                HostCommand::ToggleSidebar => self.toggle_sidebar(),
                HostCommand::SwitchPane => {
                    if self.ai_pane == Some(AiKind::Discuss) {
                        self.focus = Focus::Chat;
                    }
                }
                HostCommand::FocusTitle => self.focus = Focus::Title,
                HostCommand::BlurTitle => self.focus = Focus::Body,
                HostCommand::Quit => self.quit(),
                HostCommand::Reset => {
                    self.ai_pane = None;
                    self.whisper = None;
                    self.focus = Focus::Body;
                }
            }
        }
    }

    fn enter_ai_mode(&mut self, kind: AiKind, payload: Option<String>) {
        if self.client.is_none() {
            self.whisper = Some(WhisperNote::new(
                "AI is unavailable. Set ANTHROPIC_API_KEY and restart.".to_string(),
            ));
            return;
        }

        self.ai_pane = Some(kind);
        match kind {
            AiKind::Discuss => {
                self.focus = Focus::Chat;
                if let Some(selection) = payload {
                    self.chat.input = selection;
                }
            }
            AiKind::Review | AiKind::Polish => {
                let content = payload.unwrap_or_else(|| self.shared.buffer.plain_text());
                if content.trim().is_empty() {
                    self.pane_output = "Nothing written yet.".to_string();
                    return;
                }
                self.pane_output.clear();
                let Some(client) = self.client.clone() else {
                    return;
                };
                let handle = match kind {
                    AiKind::Review => run_review(&client, &content),
                    _ => run_polish(&client, &content),
                };
                self.start_stream(handle, StreamTarget::PaneOutput);
            }
        }
    }

    fn submit_chat(&mut self) {
        if self.chat.streaming {
            return;
        }
        let Some(client) = self.client.clone() else {
            return;
        };
        let Some(text) = self.chat.submit() else {
            return;
        };
        let handle = self.discuss.send(&client, &text);
        self.chat.begin_reply();
        self.start_stream(handle, StreamTarget::Chat);
    }

    fn toggle_sidebar(&mut self) {
        if self.sidebar.is_some() {
            self.sidebar = None;
            self.focus = Focus::Body;
        } else {
            let mut sidebar = FileBrowser::new();
            sidebar.set_drafts(self.store.list());
            self.sidebar = Some(sidebar);
            self.focus = Focus::Sidebar;
        }
    }

    fn new_session(&mut self) {
        self.save_current();
        self.shared.buffer = TextBuffer::new();
        self.shared.title.clear();
        self.current_path = None;
        self.surface = SurfaceController::new();
        self.title_controller = TitleController::new();
        self.stats.reset();
        self.ai_pane = None;
        self.reset_discussion();
        self.screen = Screen::Editor;
        self.focus = Focus::Body;
    }

    /// The discussion belongs to one draft; switching drafts starts it over.
    fn reset_discussion(&mut self) {
        if let Some(active) = self.stream.take() {
            active.handle.abort();
        }
        self.discuss.reset();
        self.chat = ChatState::new();
    }

    fn load_draft(&mut self, path: PathBuf) -> Result<()> {
        let (title, body) = self.store.load(&path)?;
        self.shared.title.set_text(&title);
        self.shared.buffer = TextBuffer::from_text(&body);
        self.current_path = Some(path);
        self.surface = SurfaceController::new();
        self.title_controller = TitleController::new();
        self.stats.reset();
        self.ai_pane = None;
        self.reset_discussion();
        self.screen = Screen::Editor;
        self.focus = Focus::Body;
        Ok(())
    }

    fn save_current(&mut self) {
        let title = self.shared.title.text().to_string();
        let body = self.shared.buffer.plain_text();
        match self.store.save(&title, &body, self.current_path.as_deref()) {
            Ok(path) => {
                if path.is_some() {
                    self.current_path = path;
                }
            }
            Err(err) => tracing::warn!("failed to save draft: {err}"),
        }
    }

    fn quit(&mut self) {
        self.save_current();
        if let Some(active) = self.stream.take() {
            active.handle.abort();
        }
        self.should_quit = true;
    }

    fn start_stream(&mut self, handle: AiHandle, target: StreamTarget) {
        if let Some(active) = self.stream.take() {
            active.handle.abort();
        }
        self.stream = Some(ActiveStream { handle, target });
    }

    /// Drain pending events from the in-flight AI request, if any.
    fn pump_stream(&mut self) {
        let Some(active) = self.stream.as_ref() else {
            return;
        };

        loop {
            let event = match active.handle.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return,
                Err(TryRecvError::Disconnected) => {
                    self.stream = None;
                    return;
                }
            };

            match event {
                AiEvent::Chunk(chunk) => match active.target {
                    StreamTarget::Chat => self.chat.append_reply(&chunk),
                    StreamTarget::PaneOutput => self.pane_output.push_str(&chunk),
                    // Whispers show only once complete.
                    StreamTarget::Whisper => {}
                },
                AiEvent::Done(full) => {
                    match active.target {
                        StreamTarget::Chat => {
                            self.chat.finish_reply();
                            self.discuss.push_assistant(full);
                        }
                        StreamTarget::PaneOutput => {}
                        StreamTarget::Whisper => {
                            if !full.trim().is_empty() {
                                self.whisper = Some(WhisperNote::new(full));
                            }
                        }
                    }
                    self.stream = None;
                    return;
                }
                AiEvent::Failed(message) => {
                    match active.target {
                        StreamTarget::Chat => {
                            self.chat.fail_reply(&message);
                            self.discuss.drop_last_turn();
                        }
                        StreamTarget::PaneOutput => {
                            self.pane_output = format!("[{}]", message);
                        }
                        StreamTarget::Whisper => {
                            tracing::debug!("whisper failed: {message}");
                        }
                    }
                    self.stream = None;
                    return;
                }
            }
        }
    }

    /// Fire an idle whisper when the writer has gone still in Normal mode.
    fn maybe_whisper(&mut self) {
        if self.stream.is_some()
            || self.whisper.is_some()
            || self.screen != Screen::Editor
            || self.focus != Focus::Body
            || self.surface.mode() != Mode::Normal
            || !self.idle.is_idle()
        {
            return;
        }
        let Some(client) = self.client.clone() else {
            return;
        };
        let content = self.shared.buffer.plain_text();
        if !self.whisper_gate.should_fire(&content) {
            return;
        }
        self.whisper_gate.mark_fired();
        let handle = run_whisper(&client, &content);
        self.start_stream(handle, StreamTarget::Whisper);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use tempfile::tempdir;

    fn test_app(dir: &std::path::Path) -> App {
        let config = RcConfig {
            writings_dir: Some(dir.to_path_buf()),
            ai_enabled: false,
            ..RcConfig::default()
        };
        App::new(&config).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(&KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        press(app, KeyCode::Char('i'));
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
        press(app, KeyCode::Esc);
    }

    #[test]
    fn test_typing_lands_in_buffer() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "hello");
        assert_eq!(app.shared.buffer.plain_text(), "hello");
        assert_eq!(app.surface.mode(), Mode::Normal);
    }

    #[test]
    fn test_k_on_first_row_focuses_title() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.focus, Focus::Title);

        // j in the title surface blurs back to the body.
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.focus, Focus::Body);
    }

    #[test]
    fn test_title_editing_through_focus() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Char('T'));
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.shared.title.text(), "T");
        assert_eq!(app.focus, Focus::Body);
    }

    #[test]
    fn test_ai_leader_without_client_shows_notice() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "some draft content");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('r'));
        assert!(app.ai_pane.is_none());
        assert!(app.whisper.is_some());
    }

    #[test]
    fn test_browse_files_saves_and_switches_screen() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "draft body");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('b'));
        assert_eq!(app.screen, Screen::Browser);
        assert_eq!(app.browser.drafts.len(), 1);
    }

    #[test]
    fn test_browser_open_loads_draft() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "first draft");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('b'));

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::Editor);
        assert!(app.shared.buffer.is_empty());

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.shared.buffer.plain_text(), "first draft");
    }

    #[test]
    fn test_new_session_starts_blank() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "old words");
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.shared.buffer.is_empty());
        assert!(app.shared.title.text().is_empty());
        // The old draft was saved first.
        assert_eq!(app.store.list().len(), 1);
    }

    #[test]
    fn test_new_session_starts_a_fresh_discussion() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "first draft");
        app.chat.entries.push(chat::ChatEntry {
            role: ChatRole::Writer,
            text: "about the old draft".to_string(),
        });
        app.discuss.push_assistant("stale reply".to_string());

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.chat.entries.is_empty());
        assert!(app.discuss.is_empty());
    }

    #[test]
    fn test_opening_a_draft_starts_a_fresh_discussion() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "first draft");
        app.discuss.push_assistant("stale reply".to_string());

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.shared.buffer.plain_text(), "first draft");
        assert!(app.discuss.is_empty());
        assert!(app.chat.entries.is_empty());
    }

    #[test]
    fn test_sidebar_toggle_and_close() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.handle_key(&KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL));
        assert!(app.sidebar.is_some());
        assert_eq!(app.focus, Focus::Sidebar);

        press(&mut app, KeyCode::Esc);
        assert!(app.sidebar.is_none());
        assert_eq!(app.focus, Focus::Body);
    }

    #[test]
    fn test_quit_saves_current_draft() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        type_text(&mut app, "words to keep");
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
        assert_eq!(app.store.list().len(), 1);
    }

    #[test]
    fn test_escape_in_normal_resets_ai_view() {
        let dir = tempdir().unwrap();
        let mut app = test_app(dir.path());
        app.ai_pane = Some(AiKind::Review);
        app.whisper = Some(WhisperNote::new("note".to_string()));
        press(&mut app, KeyCode::Esc);
        assert!(app.ai_pane.is_none());
        assert!(app.whisper.is_none());
    }
}
