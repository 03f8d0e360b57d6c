//! Streaming client for the Anthropic Messages API.
//!
//! Requests run on a worker thread with a blocking HTTP client; text deltas
//! are forwarded over an mpsc channel so the single-threaded UI loop can
//! drain them between keystrokes. A shared cancel flag aborts an in-flight
//! stream.

use serde::Serialize;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use thiserror::Error;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    stream: bool,
    system: &'a str,
    messages: &'a [ChatMessage],
}

/// Events arriving from a streaming worker.
#[derive(Debug)]
pub enum AiEvent {
    Chunk(String),
    Done(String),
    Failed(String),
}

/// Handle to one in-flight request: the event receiver plus a cancel flag.
pub struct AiHandle {
    pub events: Receiver<AiEvent>,
    cancel: Arc<AtomicBool>,
}

impl AiHandle {
    pub fn abort(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

#[derive(Clone)]
pub struct AiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl AiClient {
    pub fn new(model: impl Into<String>) -> Result<Self, AiError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::MissingApiKey)?;
        Ok(Self {
            http: reqwest::blocking::Client::new(),
            api_key,
            model: model.into(),
        })
    }

    /// Start a streaming request on a worker thread and return immediately.
    pub fn stream(&self, system: String, messages: Vec<ChatMessage>) -> AiHandle {
        let (sender, events) = channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let client = self.clone();

        thread::spawn(move || {
            if let Err(err) = client.run_stream(&system, &messages, &sender, &worker_cancel) {
                tracing::warn!("ai stream failed: {err}");
                let _ = sender.send(AiEvent::Failed(err.to_string()));
            }
        });

        AiHandle { events, cancel }
    }

    fn run_stream(
        &self,
        system: &str,
        messages: &[ChatMessage],
        sender: &Sender<AiEvent>,
        cancel: &AtomicBool,
    ) -> Result<(), AiError> {
        tracing::debug!(model = %self.model, turns = messages.len(), "starting ai stream");
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            stream: true,
            system,
            messages,
        };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(AiError::Api(format!("{status}: {text}")));
        }

        let mut full_text = String::new();
        let reader = BufReader::new(response);
        for line in reader.lines() {
            if cancel.load(Ordering::Relaxed) {
                tracing::debug!("ai stream aborted");
                return Ok(());
            }
            let line = line.map_err(|e| AiError::Api(e.to_string()))?;
            let Some(payload) = sse_data(&line) else {
                continue;
            };
            match parse_stream_event(payload) {
                StreamEvent::TextDelta(chunk) => {
                    // The first chunk can open with stray newlines; drop them.
                    let clean = if full_text.is_empty() {
                        chunk.trim_start_matches('\n').to_string()
                    } else {
                        chunk
                    };
                    if !clean.is_empty() {
                        full_text.push_str(&clean);
                        let _ = sender.send(AiEvent::Chunk(clean));
                    }
                }
                StreamEvent::Error(message) => return Err(AiError::Api(message)),
                StreamEvent::Stop => break,
                StreamEvent::Other => {}
            }
        }

        tracing::debug!(chars = full_text.len(), "ai stream complete");
        let _ = sender.send(AiEvent::Done(full_text));
        Ok(())
    }
}

/// The `data:` payload of an SSE line, if it carries one.
fn sse_data(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

enum StreamEvent {
    TextDelta(String),
    Stop,
    Error(String),
    Other,
}

fn parse_stream_event(payload: &str) -> StreamEvent {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(payload) else {
        return StreamEvent::Other;
    };
    match value.get("type").and_then(|t| t.as_str()) {
        Some("content_block_delta") => {
            let delta = &value["delta"];
            if delta.get("type").and_then(|t| t.as_str()) == Some("text_delta") {
                if let Some(text) = delta.get("text").and_then(|t| t.as_str()) {
                    return StreamEvent::TextDelta(text.to_string());
                }
            }
            StreamEvent::Other
        }
        Some("message_stop") => StreamEvent::Stop,
        Some("error") => {
            let message = value["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            StreamEvent::Error(message)
        }
        _ => StreamEvent::Other,
    }
}
