/// Generative text service client and the operations built on it.
pub mod client;
pub mod prompts;
pub mod session;

pub use client::{AiClient, AiError, AiEvent, AiHandle, ChatMessage};
pub use session::{DiscussSession, WhisperGate, run_polish, run_review, run_whisper};
