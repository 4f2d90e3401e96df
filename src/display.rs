//! Read-only classification of session state for renderers.
//!
//! Completed words are judged as a whole; the word under the cursor is
//! judged per character. Nothing here is stored on the session.

use crate::session::{Phase, SessionState, WordOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharClass {
    Matched,
    Mismatched,
    /// next character to type
    Cursor,
    Placeholder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharCell {
    /// the typed character for typed positions, the target's otherwise
    pub char: char,
    pub class: CharClass,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WordView<'a> {
    Correct(&'a str),
    Incorrect(&'a str),
    Current(Vec<CharCell>),
    Pending(&'a str),
}

/// Classify `typed` against `target` position by position.
pub fn classify_word(target: &str, typed: &[char]) -> Vec<CharCell> {
    let mut cells: Vec<CharCell> = typed
        .iter()
        .zip(target.chars().map(Some).chain(std::iter::repeat(None)))
        .map(|(&char, expected)| CharCell {
            char,
            class: if expected == Some(char) {
                CharClass::Matched
            } else {
                CharClass::Mismatched
            },
        })
        .collect();

    cells.extend(
        target
            .chars()
            .skip(typed.len())
            .enumerate()
            .map(|(i, char)| CharCell {
                char,
                class: if i == 0 {
                    CharClass::Cursor
                } else {
                    CharClass::Placeholder
                },
            }),
    );
    cells
}

impl SessionState {
    /// One view per target word, in order.
    pub fn word_views(&self) -> Vec<WordView<'_>> {
        let current = match self.phase {
            Phase::Finished => None,
            Phase::NotStarted | Phase::Running => Some(self.current_word_index),
        };

        self.target_words
            .iter()
            .enumerate()
            .map(|(idx, target)| match self.completed.get(idx) {
                Some(done) => match done.outcome {
                    WordOutcome::Correct => WordView::Correct(target),
                    WordOutcome::Incorrect => WordView::Incorrect(target),
                },
                None if Some(idx) == current => {
                    WordView::Current(classify_word(target, &self.current_input))
                }
                None => WordView::Pending(target),
            })
            .collect()
    }
}
