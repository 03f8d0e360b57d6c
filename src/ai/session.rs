//! High-level AI operations: the multi-turn discussion session, one-shot
//! review/polish runs, and the rate-limited whisper trigger.

use crate::ai::client::{AiClient, AiHandle, ChatMessage};
use crate::ai::prompts;
use std::time::{Duration, Instant};

/// Multi-turn brainstorming session. The Messages API is stateless, so the
/// transcript is kept here and replayed on every turn.
pub struct DiscussSession {
    history: Vec<ChatMessage>,
}

impl DiscussSession {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
        }
    }

    /// Send one user turn, optionally prefixed with the current draft.
    pub fn send(&mut self, client: &AiClient, user_message: &str) -> AiHandle {
        self.history.push(ChatMessage::user(user_message));
        client.stream(prompts::discuss(), self.history.clone())
    }

    /// Record the assistant's completed reply so the next turn sees it.
    pub fn push_assistant(&mut self, text: String) {
        if !text.is_empty() {
            self.history.push(ChatMessage::assistant(text));
        }
    }

    /// Drop the last user turn when its request failed, so a retry does not
    /// duplicate it.
    pub fn drop_last_turn(&mut self) {
        if self
            .history
            .last()
            .is_some_and(|m| m.role == crate::ai::client::Role::User)
        {
            self.history.pop();
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for DiscussSession {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run_review(client: &AiClient, content: &str) -> AiHandle {
    client.stream(prompts::review(), vec![ChatMessage::user(content)])
}

pub fn run_polish(client: &AiClient, content: &str) -> AiHandle {
    client.stream(prompts::polish(), vec![ChatMessage::user(content)])
}

pub fn run_whisper(client: &AiClient, content: &str) -> AiHandle {
    client.stream(prompts::whisper(), vec![ChatMessage::user(content)])
}

/// Gate deciding when an idle whisper may fire: content must be long enough
/// and the last whisper far enough in the past.
pub struct WhisperGate {
    rate_limit: Duration,
    min_content_len: usize,
    last_fired: Option<Instant>,
}

impl WhisperGate {
    pub fn new(rate_limit: Duration) -> Self {
        Self {
            rate_limit,
            min_content_len: 50,
            last_fired: None,
        }
    }

    pub fn should_fire(&self, content: &str) -> bool {
        if content.len() < self.min_content_len {
            return false;
        }
        match self.last_fired {
            Some(at) => at.elapsed() >= self.rate_limit,
            None => true,
        }
    }

    pub fn mark_fired(&mut self) {
        self.last_fired = Some(Instant::now());
    }
}
