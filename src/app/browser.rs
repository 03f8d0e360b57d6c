use crate::store::Draft;
use crossterm::event::{KeyCode, KeyEvent};
use std::path::PathBuf;

/// What the host should do after the browser handled a key.
#[derive(Debug, PartialEq, Eq)]
pub enum BrowserAction {
    Open(PathBuf),
    NewDraft,
    Delete(PathBuf),
    Close,
    Quit,
}

/// Draft list navigation. Used both by the full-screen browser and the
/// sidebar; deletion asks for a confirming `y` first.
pub struct FileBrowser {
    pub drafts: Vec<Draft>,
    pub selected: usize,
    pub confirming_delete: bool,
}

impl FileBrowser {
    pub fn new() -> Self {
        Self {
            drafts: Vec::new(),
            selected: 0,
            confirming_delete: false,
        }
    }

    pub fn set_drafts(&mut self, drafts: Vec<Draft>) {
        self.drafts = drafts;
        if self.selected >= self.drafts.len() {
            self.selected = self.drafts.len().saturating_sub(1);
        }
        self.confirming_delete = false;
    }

    pub fn selected_draft(&self) -> Option<&Draft> {
        self.drafts.get(self.selected)
    }

    pub fn handle_key(&mut self, key_event: &KeyEvent) -> Option<BrowserAction> {
        if self.confirming_delete {
            self.confirming_delete = false;
            if key_event.code == KeyCode::Char('y') {
                return self
                    .selected_draft()
                    .map(|d| BrowserAction::Delete(d.path.clone()));
            }
            return None;
        }

        match key_event.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.drafts.len() {
                    self.selected += 1;
                }
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            KeyCode::Enter => self
                .selected_draft()
                .map(|d| BrowserAction::Open(d.path.clone())),
            KeyCode::Char('n') => Some(BrowserAction::NewDraft),
            KeyCode::Char('d') => {
                if self.selected_draft().is_some() {
                    self.confirming_delete = true;
                }
                None
            }
            KeyCode::Esc => Some(BrowserAction::Close),
            KeyCode::Char('q') => Some(BrowserAction::Quit),
            _ => None,
        }
    }
}

impl Default for FileBrowser {
    fn default() -> Self {
        Self::new()
    }
}
