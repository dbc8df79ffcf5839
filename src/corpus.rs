use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;

static LANG_DIR: Dir = include_dir!("src/lang");

const BUILTIN_FILE: &str = "vocabulary.json";

#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("Word file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Word file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Built-in word list missing: {0}")]
    MissingBuiltin(String),

    #[error("Word list contains no usable words")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub definition: String,
}

impl WordEntry {
    pub fn new(word: &str, definition: &str) -> Self {
        Self {
            word: word.to_string(),
            definition: definition.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.word.len()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }
}

/// Validated, ordered vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    entries: Vec<WordEntry>,
}

impl Corpus {
    /// Normalises entries: lowercases, drops anything that is not plain
    /// ASCII letters, removes duplicate words keeping the first.
    pub fn new(entries: Vec<WordEntry>) -> Result<Self, CorpusError> {
        let entries: Vec<WordEntry> = entries
            .into_iter()
            .map(|e| WordEntry {
                word: e.word.trim().to_ascii_lowercase(),
                definition: e.definition.trim().to_string(),
            })
            .filter(|e| !e.word.is_empty() && e.word.bytes().all(|b| b.is_ascii_lowercase()))
            .unique_by(|e| e.word.clone())
            .collect();

        if entries.is_empty() {
            return Err(CorpusError::Empty);
        }

        Ok(Self { entries })
    }

    pub fn builtin() -> Result<Self, CorpusError> {
        let file = LANG_DIR
            .get_file(BUILTIN_FILE)
            .ok_or_else(|| CorpusError::MissingBuiltin(BUILTIN_FILE.to_string()))?;
        let text = file
            .contents_utf8()
            .ok_or_else(|| CorpusError::MissingBuiltin(BUILTIN_FILE.to_string()))?;
        Self::from_json(text)
    }

    pub fn from_json(text: &str) -> Result<Self, CorpusError> {
        let entries: Vec<WordEntry> = serde_json::from_str(text)?;
        Self::new(entries)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CorpusError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn entries(&self) -> &[WordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Words whose length falls in `band`, in corpus order. Falls back to
    /// the whole corpus when nothing matches so a session always has words.
    pub fn in_band(&self, band: &RangeInclusive<usize>) -> Vec<WordEntry> {
        let matching: Vec<WordEntry> = self
            .entries
            .iter()
            .filter(|e| band.contains(&e.len()))
            .cloned()
            .collect();

        if matching.is_empty() {
            self.entries.clone()
        } else {
            matching
        }
    }

    /// Band-filtered words in pseudorandom order drawn from `rng`
    pub fn shuffled<R: Rng + ?Sized>(&self, band: &RangeInclusive<usize>, rng: &mut R) -> Vec<WordEntry> {
        let mut words = self.in_band(band);
        words.shuffle(rng);
        words
    }
}
