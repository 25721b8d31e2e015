//! Pluggable definition cache trait.
//!
//! Any word → definitions store implements `DefinitionCache`.
//! Current implementations: MemoryCache, FileCache, JsonMapCache here, and
//! SqliteStore in `termdict-sqlite`.

use std::sync::Arc;

use termdict_core::{Definition, Result};

/// Durable or in-memory store of word → definitions.
///
/// Every method normalizes `word` before using it as a key. `contains` and
/// `lookup` are read-only; `save` replaces any prior value (last write wins).
/// Implementations must tolerate concurrent readers and writers from several
/// threads, hence `Send + Sync` and `&self` everywhere.
///
/// # Implementing a new backend
///
/// ```ignore
/// struct MyCache { /* ... */ }
///
/// impl DefinitionCache for MyCache {
///     fn contains(&self, word: &str) -> Result<bool> { /* ... */ }
///     fn lookup(&self, word: &str) -> Result<Vec<Definition>> { /* ... */ }
///     fn save(&self, word: &str, defs: &[Definition]) -> Result<()> { /* ... */ }
///     fn name(&self) -> &str { "MyCache" }
/// }
/// ```
pub trait DefinitionCache: Send + Sync {
    /// Whether an entry exists for `word`. A missing entry is `Ok(false)`;
    /// `Err` means the backing store itself failed.
    fn contains(&self, word: &str) -> Result<bool>;

    /// Stored definitions for `word`, in the order they were saved.
    /// Fails with a NotFound-kind error when there is no entry.
    fn lookup(&self, word: &str) -> Result<Vec<Definition>>;

    /// Write `defs` under `word`, replacing any previous entry.
    /// A blank word is rejected with an InvalidInput-kind error.
    fn save(&self, word: &str, defs: &[Definition]) -> Result<()>;

    /// Human-readable name of this backend (for logging).
    fn name(&self) -> &str;
}

impl<T: DefinitionCache + ?Sized> DefinitionCache for &T {
    fn contains(&self, word: &str) -> Result<bool> {
        (**self).contains(word)
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        (**self).lookup(word)
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        (**self).save(word, defs)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: DefinitionCache + ?Sized> DefinitionCache for Box<T> {
    fn contains(&self, word: &str) -> Result<bool> {
        (**self).contains(word)
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        (**self).lookup(word)
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        (**self).save(word, defs)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<T: DefinitionCache + ?Sized> DefinitionCache for Arc<T> {
    fn contains(&self, word: &str) -> Result<bool> {
        (**self).contains(word)
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        (**self).lookup(word)
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        (**self).save(word, defs)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Normalize `word` for use as a key, rejecting blank input.
pub fn key_for_save(word: &str) -> Result<String> {
    let key = termdict_core::normalize(word);
    if key.is_empty() {
        return Err(termdict_core::DictError::InvalidInput(
            "word is blank".to_string(),
        ));
    }
    Ok(key)
}
