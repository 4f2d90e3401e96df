use std::time::Instant;

use crate::{
    session::{
        CompletedWord, Phase, SessionState, WordOutcome, MIN_WORDS_LEFT, WORDS_TO_GENERATE,
    },
    word_supply::WordSource,
};

/// Discrete events fed into a session one at a time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Char(char),
    Backspace,
    Space,
    Cancel,
    Tick,
    Resize,
}

impl SessionEvent {
    fn is_keystroke(&self) -> bool {
        match self {
            SessionEvent::Char(c) => !c.is_control(),
            SessionEvent::Backspace | SessionEvent::Space => true,
            SessionEvent::Cancel | SessionEvent::Tick | SessionEvent::Resize => false,
        }
    }
}

/// What an event did to the session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Changed,
    Started,
    Finished,
    Cancelled,
}

impl SessionState {
    /// Feed one event through the session state machine.
    ///
    /// Illegal input (typing past the end of a word, space on an empty word,
    /// backspace into a scored word) leaves the state untouched.
    pub fn apply(
        &mut self,
        event: SessionEvent,
        now: Instant,
        supply: &dyn WordSource,
    ) -> Transition {
        match (self.phase, event) {
            (_, SessionEvent::Cancel) => {
                tracing::info!(phase = %self.phase, "session cancelled");
                Transition::Cancelled
            }
            (_, SessionEvent::Tick) => self.on_tick(now),
            (Phase::Finished, _) | (_, SessionEvent::Resize) => Transition::Unchanged,
            (Phase::NotStarted, ev) if ev.is_keystroke() => {
                self.activate(now);
                self.process(ev, now, supply);
                if self.has_finished() {
                    Transition::Finished
                } else {
                    Transition::Started
                }
            }
            (Phase::NotStarted, _) => Transition::Unchanged,
            (Phase::Running, ev) => self.process(ev, now, supply),
        }
    }

    /// NotStarted -> Running. The countdown starts here, not at construction.
    pub fn activate(&mut self, now: Instant) {
        if self.phase != Phase::NotStarted {
            return;
        }
        self.phase = Phase::Running;
        self.started_at = Some(now);
        tracing::info!(
            duration_secs = self.time_remaining,
            words = self.target_words.len(),
            "session started"
        );
    }

    /// Handle a keystroke while running.
    pub fn process(
        &mut self,
        event: SessionEvent,
        now: Instant,
        supply: &dyn WordSource,
    ) -> Transition {
        if self.phase != Phase::Running {
            return Transition::Unchanged;
        }

        let transition = match event {
            SessionEvent::Backspace => self.erase(),
            SessionEvent::Space | SessionEvent::Char(' ') => self.complete_word(now, supply),
            SessionEvent::Char(c) if !c.is_control() => self.type_char(c),
            _ => Transition::Unchanged,
        };
        tracing::trace!(?event, ?transition, cursor = self.word_cursor());
        transition
    }

    fn erase(&mut self) -> Transition {
        // a scored word can't be reopened
        if self.current_input.pop().is_none() {
            return Transition::Unchanged;
        }
        self.typed_text.pop();
        Transition::Changed
    }

    fn type_char(&mut self, c: char) -> Transition {
        let target_len = self.current_word().chars().count();
        if self.current_input.len() >= target_len {
            return Transition::Unchanged;
        }
        self.current_input.push(c);
        self.typed_text.push(c);
        Transition::Changed
    }

    fn complete_word(&mut self, now: Instant, supply: &dyn WordSource) -> Transition {
        if self.current_input.is_empty() {
            return Transition::Unchanged;
        }

        let typed: String = self.current_input.drain(..).collect();
        let outcome = if typed == self.target_words[self.current_word_index] {
            self.correct_count += 1;
            WordOutcome::Correct
        } else {
            self.error_count += 1;
            WordOutcome::Incorrect
        };
        tracing::debug!(
            index = self.current_word_index,
            target = %self.target_words[self.current_word_index],
            %typed,
            ?outcome,
            "word completed"
        );
        self.completed.push(CompletedWord { typed, outcome });

        if self.current_word_index + 1 == self.target_words.len() {
            self.finish(now);
            return Transition::Finished;
        }

        self.typed_text.push(' ');
        self.current_word_index += 1;
        self.top_up(supply);
        Transition::Changed
    }

    fn top_up(&mut self, supply: &dyn WordSource) {
        if !self.replenish {
            return;
        }
        let words_left = self.target_words.len() - self.current_word_index;
        if words_left < MIN_WORDS_LEFT {
            let batch = supply.sample(WORDS_TO_GENERATE);
            tracing::debug!(words_left, added = batch.len(), "replenishing target words");
            self.target_words.extend(batch);
        }
    }
}
