//! The user's personal vocabulary list.
//!
//! `VocabRepo` is what the command layer talks to. `FileVocabRepo` keeps the
//! list as a JSON array of words in a single file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use termdict_core::{normalize, write_json_atomic, DictError, JsonLayout, Result};

// ─── VocabRepo ────────────────────────────────────────────────────

/// Persistent word list. Every method normalizes the words it receives.
pub trait VocabRepo: Send + Sync {
    /// Add words, ignoring ones already present. Returns the words that were
    /// newly added, normalized, in request order.
    fn add_words(&self, words: &[String]) -> Result<Vec<String>>;

    /// Remove words, ignoring ones not present. Returns the words that were
    /// actually removed, normalized, in request order.
    fn remove_words(&self, words: &[String]) -> Result<Vec<String>>;

    /// All words, sorted.
    fn list_words(&self) -> Result<Vec<String>>;
}

impl<T: VocabRepo + ?Sized> VocabRepo for &T {
    fn add_words(&self, words: &[String]) -> Result<Vec<String>> {
        (**self).add_words(words)
    }
    fn remove_words(&self, words: &[String]) -> Result<Vec<String>> {
        (**self).remove_words(words)
    }
    fn list_words(&self) -> Result<Vec<String>> {
        (**self).list_words()
    }
}

impl<T: VocabRepo + ?Sized> VocabRepo for Box<T> {
    fn add_words(&self, words: &[String]) -> Result<Vec<String>> {
        (**self).add_words(words)
    }
    fn remove_words(&self, words: &[String]) -> Result<Vec<String>> {
        (**self).remove_words(words)
    }
    fn list_words(&self) -> Result<Vec<String>> {
        (**self).list_words()
    }
}

impl<T: VocabRepo + ?Sized> VocabRepo for Arc<T> {
    fn add_words(&self, words: &[String]) -> Result<Vec<String>> {
        (**self).add_words(words)
    }
    fn remove_words(&self, words: &[String]) -> Result<Vec<String>> {
        (**self).remove_words(words)
    }
    fn list_words(&self) -> Result<Vec<String>> {
        (**self).list_words()
    }
}

// ─── VocabList ────────────────────────────────────────────────────

/// In-memory word list with set semantics over normalized words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VocabList {
    words: Vec<String>,
}

impl VocabList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = normalize(word);
        self.words.iter().any(|w| *w == word)
    }

    /// Add a word. Returns the normalized word if it was not already present.
    /// Blank words are never added.
    pub fn add(&mut self, word: &str) -> Option<String> {
        let word = normalize(word);
        if word.is_empty() || self.words.contains(&word) {
            return None;
        }
        self.words.push(word.clone());
        Some(word)
    }

    /// Remove a word. Returns the normalized word if it was present.
    pub fn remove(&mut self, word: &str) -> Option<String> {
        let word = normalize(word);
        let idx = self.words.iter().position(|w| *w == word)?;
        Some(self.words.remove(idx))
    }

    pub fn sorted(&self) -> Vec<String> {
        let mut words = self.words.clone();
        words.sort();
        words
    }
}

// ─── FileVocabRepo ────────────────────────────────────────────────

/// Vocab list stored as a JSON array in one file. A missing file is an
/// empty list; the file and its parent directory are created on first write.
pub struct FileVocabRepo {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileVocabRepo {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<VocabList> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(VocabList::new()),
            Err(e) => return Err(DictError::io(format!("read {:?}", self.path), e)),
        };
        serde_json::from_str(&content).map_err(|e| DictError::corrupt(format!("{:?}", self.path), e))
    }

    pub fn save(&self, list: &VocabList) -> Result<()> {
        write_json_atomic(&self.path, list, JsonLayout::Compact)
    }

    /// Load, apply `f`, and save only if `f` changed something.
    fn update<F>(&self, f: F) -> Result<Vec<String>>
    where
        F: FnOnce(&mut VocabList) -> Vec<String>,
    {
        let _guard = self.lock.lock();
        let mut list = self.load()?;
        let changed = f(&mut list);
        if !changed.is_empty() {
            self.save(&list)?;
            tracing::debug!(path = ?self.path, words = list.len(), "vocab list saved");
        }
        Ok(changed)
    }
}

impl VocabRepo for FileVocabRepo {
    fn add_words(&self, words: &[String]) -> Result<Vec<String>> {
        self.update(|list| words.iter().filter_map(|w| list.add(w)).collect())
    }

    fn remove_words(&self, words: &[String]) -> Result<Vec<String>> {
        self.update(|list| words.iter().filter_map(|w| list.remove(w)).collect())
    }

    fn list_words(&self) -> Result<Vec<String>> {
        Ok(self.load()?.sorted())
    }
}
