//! MemoryCache: process-local definition cache, mainly for tests and
//! `--cache memory` runs.

use std::collections::HashMap;

use parking_lot::RwLock;
use termdict_core::{normalize, DictError, Definition, Result};

use crate::cache_trait::{key_for_save, DefinitionCache};

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Vec<Definition>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pre-populated cache. Keys are normalized.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Definition>)>,
        S: AsRef<str>,
    {
        let entries = entries
            .into_iter()
            .map(|(word, defs)| (normalize(word.as_ref()), defs))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DefinitionCache for MemoryCache {
    fn contains(&self, word: &str) -> Result<bool> {
        Ok(self.entries.read().contains_key(&normalize(word)))
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        let key = normalize(word);
        self.entries
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| DictError::not_found(key))
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        let key = key_for_save(word)?;
        self.entries.write().insert(key, defs.to_vec());
        Ok(())
    }

    fn name(&self) -> &str {
        "MemoryCache"
    }
}
