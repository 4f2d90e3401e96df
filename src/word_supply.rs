use rand::seq::SliceRandom;

use crate::{language::Language, session::SessionError};

/// Supplies batches of target words to a session
pub trait WordSource {
    /// Returns `min(n, corpus size)` lower-cased words.
    fn sample(&self, n: usize) -> Vec<String>;
}

/// Immutable word corpus sampled uniformly with replacement
#[derive(Debug, Clone)]
pub struct Corpus {
    words: Vec<String>,
}

impl Corpus {
    pub fn new<I, S>(words: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .flat_map(|w| {
                w.as_ref()
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect();

        if words.is_empty() {
            return Err(SessionError::EmptyCorpus);
        }

        Ok(Self { words })
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl TryFrom<Language> for Corpus {
    type Error = SessionError;

    fn try_from(language: Language) -> Result<Self, Self::Error> {
        Corpus::new(language.words)
    }
}

impl WordSource for Corpus {
    fn sample(&self, n: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let n = n.min(self.words.len());

        // independent draws; duplicates are allowed
        (0..n)
            .filter_map(|_| self.words.choose(&mut rng))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_sample_returns_requested_count() {
        let corpus = Corpus::new(["alpha", "beta", "gamma", "delta"]).unwrap();
        assert_eq!(corpus.sample(3).len(), 3);
        assert_eq!(corpus.sample(0).len(), 0);
    }

    #[test]
    fn test_sample_caps_at_corpus_size() {
        let corpus = Corpus::new(["cat", "dog"]).unwrap();
        assert_eq!(corpus.sample(10).len(), 2);
    }

    #[test]
    fn test_sample_draws_from_corpus() {
        let corpus = Corpus::new(["cat", "dog"]).unwrap();
        for word in corpus.sample(2) {
            assert!(word == "cat" || word == "dog");
        }
    }

    #[test]
    fn test_words_are_lowercased() {
        let corpus = Corpus::new(["Hello", "WORLD"]).unwrap();
        assert_eq!(corpus.words(), ["hello", "world"]);
        assert!(corpus
            .sample(2)
            .iter()
            .all(|w| w.chars().all(|c| !c.is_uppercase())));
    }

    #[test]
    fn test_blank_entries_are_dropped() {
        let corpus = Corpus::new(["", "  ", "ok"]).unwrap();
        assert_eq!(corpus.len(), 1);
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        assert_matches!(
            Corpus::new(Vec::<String>::new()),
            Err(SessionError::EmptyCorpus)
        );
        assert_matches!(Corpus::new(["", " "]), Err(SessionError::EmptyCorpus));
    }

    #[test]
    fn test_corpus_from_embedded_language() {
        let lang = Language::new("english").unwrap();
        let corpus = Corpus::try_from(lang).unwrap();
        assert!(!corpus.is_empty());
        assert_eq!(corpus.sample(20).len(), 20);
    }
}
