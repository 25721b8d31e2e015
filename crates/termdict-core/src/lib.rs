//! Core types for termdict: definitions, word normalization, errors and the
//! `Definer` capability.

pub mod atomic;
pub mod error;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use atomic::{write_json_atomic, JsonLayout};
pub use error::{DictError, ErrorKind, Result};

// ─── Definition ──────────────────────────────────────────────────

/// One sense of a word: a part of speech paired with its meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Definition {
    pub part_of_speech: String,
    pub meaning: String,
}

impl Definition {
    pub fn new(part_of_speech: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            part_of_speech: part_of_speech.into(),
            meaning: meaning.into(),
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.part_of_speech, self.meaning)
    }
}

// ─── Words ───────────────────────────────────────────────────────

/// Canonical key form of a word: trimmed and lowercased.
///
/// Caches and word lists call this at their boundary so `"Kappa"` and
/// `"kappa"` address the same entry.
pub fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}

// ─── Definer ─────────────────────────────────────────────────────

/// Anything that can produce definitions for a word.
///
/// Fails with [`ErrorKind::NotFound`] when the word is unknown and with
/// [`ErrorKind::SourceUnavailable`] when the lookup itself could not be done.
/// Implementations are `Send + Sync` so lookups for different words may run
/// in parallel.
pub trait Definer: Send + Sync {
    fn define(&self, word: &str) -> Result<Vec<Definition>>;
}

impl<T: Definer + ?Sized> Definer for &T {
    fn define(&self, word: &str) -> Result<Vec<Definition>> {
        (**self).define(word)
    }
}

impl<T: Definer + ?Sized> Definer for Box<T> {
    fn define(&self, word: &str) -> Result<Vec<Definition>> {
        (**self).define(word)
    }
}

impl<T: Definer + ?Sized> Definer for Arc<T> {
    fn define(&self, word: &str) -> Result<Vec<Definition>> {
        (**self).define(word)
    }
}
