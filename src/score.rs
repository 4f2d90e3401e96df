use std::time::Duration;

use crate::session::SessionState;

/// Characters counted as one word
pub const CHARS_PER_WORD: f64 = 5.0;
/// Lower bound on elapsed minutes used for WPM
pub const MIN_ELAPSED_MINUTES: f64 = 0.5;

/// Results of a finished session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub gross_wpm: u32,
    pub net_wpm: u32,
    pub accuracy: f64,
    pub correct: usize,
    pub errors: usize,
}

impl Score {
    /// Score a finished session; `None` until it has finished.
    pub fn from_session(session: &SessionState) -> Option<Self> {
        let elapsed = session.elapsed()?;
        let typed_chars = session.typed_chars();
        let correct = session.correct_count();
        let errors = session.error_count();

        Some(Self {
            gross_wpm: gross_wpm(typed_chars, elapsed),
            net_wpm: net_wpm(typed_chars, errors, elapsed),
            accuracy: accuracy(correct, errors),
            correct,
            errors,
        })
    }
}

pub fn elapsed_minutes(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() / 60.0).max(MIN_ELAPSED_MINUTES)
}

pub fn gross_wpm(typed_chars: usize, elapsed: Duration) -> u32 {
    let words = typed_chars as f64 / CHARS_PER_WORD;
    (words / elapsed_minutes(elapsed)).floor() as u32
}

/// Gross WPM less one word per incorrect word, never below zero.
pub fn net_wpm(typed_chars: usize, errors: usize, elapsed: Duration) -> u32 {
    let words = typed_chars as f64 / CHARS_PER_WORD - errors as f64;
    (words / elapsed_minutes(elapsed)).max(0.0).floor() as u32
}

/// Percentage of completed words typed correctly.
pub fn accuracy(correct: usize, errors: usize) -> f64 {
    let total = correct + errors;
    if total == 0 {
        return 100.0;
    }
    100.0 * correct as f64 / total as f64
}
