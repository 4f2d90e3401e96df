use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use thiserror::Error;

static LANG_DIR: Dir = include_dir!("src/lang");

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("language file `{0}` not found")]
    NotFound(String),
    #[error("language file `{0}` is not valid utf-8")]
    NotUtf8(String),
    #[error("unable to deserialize language `{name}`: {source}")]
    Malformed {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("language `{0}` has no words")]
    Empty(String),
}

/// A word list embedded into the binary at build time
#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    /// Load an embedded word list by file stem, e.g. `english`.
    pub fn new(file_stem: &str) -> Result<Self, LanguageError> {
        read_language_from_file(&format!("{file_stem}.json"))
    }

    /// File stems of every embedded word list, sorted.
    pub fn available() -> Vec<String> {
        let mut names: Vec<String> = LANG_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|ext| ext == "json"))
            .filter_map(|f| f.path().file_stem()?.to_str().map(str::to_owned))
            .collect();
        names.sort();
        names
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language, LanguageError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| LanguageError::NotFound(file_name.to_owned()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| LanguageError::NotUtf8(file_name.to_owned()))?;

    parse_language(file_name, file_as_str)
}

fn parse_language(name: &str, json: &str) -> Result<Language, LanguageError> {
    let lang: Language = from_str(json).map_err(|source| LanguageError::Malformed {
        name: name.to_owned(),
        source,
    })?;

    if lang.words.iter().all(|w| w.trim().is_empty()) {
        return Err(LanguageError::Empty(lang.name));
    }

    Ok(lang)
}
