//! Transcript and input line for the discussion pane.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    Writer,
    Companion,
}

#[derive(Debug, Clone)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
}

pub struct ChatState {
    pub entries: Vec<ChatEntry>,
    pub input: String,
    /// An assistant reply is currently streaming into the last entry.
    pub streaming: bool,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            input: String::new(),
            streaming: false,
        }
    }

    /// Take the input line as a submitted turn, if non-empty.
    pub fn submit(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input.clear();
        self.entries.push(ChatEntry {
            role: ChatRole::Writer,
            text: text.clone(),
        });
        Some(text)
    }

    pub fn begin_reply(&mut self) {
        self.entries.push(ChatEntry {
            role: ChatRole::Companion,
            text: String::new(),
        });
        self.streaming = true;
    }

    pub fn append_reply(&mut self, chunk: &str) {
        if let Some(entry) = self.entries.last_mut() {
            if entry.role == ChatRole::Companion {
                entry.text.push_str(chunk);
            }
        }
    }

    pub fn finish_reply(&mut self) {
        self.streaming = false;
    }

    /// Replace a failed streaming reply with an error notice.
    pub fn fail_reply(&mut self, message: &str) {
        self.streaming = false;
        if let Some(entry) = self.entries.last_mut() {
            if entry.role == ChatRole::Companion {
                entry.text = format!("[{}]", message);
            }
        }
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}
