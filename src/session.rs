use std::time::{Duration, Instant};

use thiserror::Error;

use crate::word_supply::WordSource;

/// Number of words sampled when a session is created
pub const INITIAL_WORD_COUNT: usize = 20;
/// Replenish once fewer than this many words remain from the current one onward
pub const MIN_WORDS_LEFT: usize = 8;
/// Batch size appended on replenishment
pub const WORDS_TO_GENERATE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("test duration must be greater than 0 seconds")]
    InvalidDuration,
    #[error("word corpus is empty")]
    EmptyCorpus,
    #[error("prompt contains no words")]
    EmptyPrompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    #[strum(serialize = "not started")]
    NotStarted,
    #[strum(serialize = "running")]
    Running,
    #[strum(serialize = "finished")]
    Finished,
}

/// Validated session parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    duration_secs: u32,
}

impl SessionConfig {
    pub fn new(duration_secs: u32) -> Result<Self, SessionError> {
        if duration_secs == 0 {
            return Err(SessionError::InvalidDuration);
        }
        Ok(Self { duration_secs })
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum WordOutcome {
    Correct,
    Incorrect,
}

/// A word the user has moved past, judged as a unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedWord {
    pub typed: String,
    pub outcome: WordOutcome,
}

/// State of one typing test.
///
/// Fields only change through [`SessionState::apply`] and
/// [`SessionState::on_tick`]; once the phase is [`Phase::Finished`] nothing
/// changes again.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub(crate) phase: Phase,
    pub(crate) target_words: Vec<String>,
    pub(crate) current_word_index: usize,
    /// characters typed into the current word
    pub(crate) current_input: Vec<char>,
    pub(crate) completed: Vec<CompletedWord>,
    /// everything typed, space-separated; used for scoring only
    pub(crate) typed_text: String,
    pub(crate) correct_count: usize,
    pub(crate) error_count: usize,
    pub(crate) time_remaining: u32,
    pub(crate) started_at: Option<Instant>,
    pub(crate) ended_at: Option<Instant>,
    pub(crate) replenish: bool,
    config: SessionConfig,
}

impl SessionState {
    /// Start a session with words sampled from `supply`; the queue is
    /// topped up from the same supply as the user advances.
    pub fn new(config: SessionConfig, supply: &dyn WordSource) -> Result<Self, SessionError> {
        let words = supply.sample(INITIAL_WORD_COUNT);
        if words.is_empty() {
            return Err(SessionError::EmptyCorpus);
        }
        Ok(Self::from_parts(config, words, true))
    }

    /// Start a session over a fixed prompt that is never extended.
    pub fn with_prompt(config: SessionConfig, prompt: &str) -> Result<Self, SessionError> {
        let words: Vec<String> = prompt.split_whitespace().map(str::to_lowercase).collect();
        if words.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        Ok(Self::from_parts(config, words, false))
    }

    fn from_parts(config: SessionConfig, target_words: Vec<String>, replenish: bool) -> Self {
        Self {
            phase: Phase::NotStarted,
            target_words,
            current_word_index: 0,
            current_input: Vec::new(),
            completed: Vec::new(),
            typed_text: String::new(),
            correct_count: 0,
            error_count: 0,
            time_remaining: config.duration_secs(),
            started_at: None,
            ended_at: None,
            replenish,
            config,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::NotStarted
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn target_words(&self) -> &[String] {
        &self.target_words
    }

    pub fn current_word_index(&self) -> usize {
        self.current_word_index
    }

    pub fn current_word(&self) -> &str {
        &self.target_words[self.current_word_index]
    }

    pub fn current_input(&self) -> &[char] {
        &self.current_input
    }

    /// Characters typed so far into the current word.
    pub fn word_cursor(&self) -> usize {
        self.current_input.len()
    }

    pub fn completed_words(&self) -> &[CompletedWord] {
        &self.completed
    }

    pub fn typed_text(&self) -> &str {
        &self.typed_text
    }

    /// Length of the typed text in characters, delimiters included.
    pub fn typed_chars(&self) -> usize {
        self.typed_text.chars().count()
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<Instant> {
        self.ended_at
    }

    pub fn replenishes(&self) -> bool {
        self.replenish
    }

    /// `ended_at - started_at` once finished.
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.started_at, self.ended_at) {
            (Some(start), Some(end)) => Some(end.saturating_duration_since(start)),
            _ => None,
        }
    }

    pub(crate) fn finish(&mut self, now: Instant) {
        self.phase = Phase::Finished;
        self.ended_at = Some(now);
        tracing::info!(
            correct = self.correct_count,
            errors = self.error_count,
            typed_chars = self.typed_chars(),
            time_remaining = self.time_remaining,
            "session finished"
        );
    }
}
