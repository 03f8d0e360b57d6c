use std::time::{Duration, Instant};

/// Below this much Insert time the WPM reading is noise, so show zero.
const MIN_ACTIVE_TIME: Duration = Duration::from_secs(3);

/// Session typing statistics. Both the rate and the clock count only time
/// actually spent in Insert mode, so pauses for thinking do not drag the
/// rate down.
pub struct TypingStats {
    chars_typed: u64,
    insert_time: Duration,
    insert_entered: Option<Instant>,
}

impl TypingStats {
    pub fn new() -> Self {
        Self {
            chars_typed: 0,
            insert_time: Duration::ZERO,
            insert_entered: None,
        }
    }

    pub fn enter_insert(&mut self) {
        if self.insert_entered.is_none() {
            self.insert_entered = Some(Instant::now());
        }
    }

    pub fn leave_insert(&mut self) {
        if let Some(entered) = self.insert_entered.take() {
            self.insert_time += entered.elapsed();
        }
    }

    pub fn record_char(&mut self) {
        self.chars_typed += 1;
    }

    fn active_time(&self) -> Duration {
        let mut active = self.insert_time;
        if let Some(entered) = self.insert_entered {
            active += entered.elapsed();
        }
        active
    }

    /// Standard five-characters-per-word rate over accumulated Insert time.
    pub fn wpm(&self) -> u32 {
        let active = self.active_time();
        if active < MIN_ACTIVE_TIME {
            return 0;
        }
        let minutes = active.as_secs_f64() / 60.0;
        ((self.chars_typed as f64 / 5.0) / minutes).round() as u32
    }

    /// Accumulated Insert time as "m:ss".
    pub fn elapsed(&self) -> String {
        let secs = self.active_time().as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for TypingStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wpm_is_zero_without_typing() {
        let stats = TypingStats::new();
        assert_eq!(stats.wpm(), 0);
    }

    #[test]
    fn test_wpm_counts_only_insert_time() {
        let mut stats = TypingStats::new();
        stats.insert_time = Duration::from_secs(60);
        for _ in 0..300 {
            stats.record_char();
        }
        // 300 chars / 5 = 60 words over one minute.
        assert_eq!(stats.wpm(), 60);
    }

    #[test]
    fn test_elapsed_format() {
        let stats = TypingStats::new();
        assert_eq!(stats.elapsed(), "0:00");
    }

    #[test]
    fn test_reset_clears_counts() {
        let mut stats = TypingStats::new();
        stats.record_char();
        stats.insert_time = Duration::from_secs(60);
        stats.reset();
        assert_eq!(stats.wpm(), 0);
    }
}
