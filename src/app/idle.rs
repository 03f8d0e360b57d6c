use std::time::{Duration, Instant};

/// Tracks keyboard stillness for the idle whisper trigger.
pub struct IdleTracker {
    last_activity: Instant,
    timeout: Duration,
}

impl IdleTracker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_activity: Instant::now(),
            timeout,
        }
    }

    pub fn record_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn is_idle(&self) -> bool {
        self.last_activity.elapsed() >= self.timeout
    }
}

/// A whisper currently on screen. Cleared by the next keystroke or after
/// its display window runs out.
pub struct WhisperNote {
    pub text: String,
    shown_at: Instant,
}

const WHISPER_DISPLAY: Duration = Duration::from_secs(10);

impl WhisperNote {
    pub fn new(text: String) -> Self {
        Self {
            text,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= WHISPER_DISPLAY
    }
}
