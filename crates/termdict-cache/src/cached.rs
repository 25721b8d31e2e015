//! CachedDefiner: cache-aside lookup in front of a fallback `Definer`.
//!
//! 1. `contains` on the cache; a cache fault is returned as-is
//! 2. hit → `lookup` result is returned, fallback never consulted
//! 3. miss → fallback `define`; a failure is returned and nothing is cached
//! 4. fetched → `save`; a save failure is returned and the fetched
//!    definitions are discarded, so a successful result is always cached
//!
//! The word is passed through untouched; both collaborators normalize it.
//! No retries, no locking: two concurrent misses on the same word may both
//! fetch, and the later `save` wins.

use termdict_core::{Definer, Definition, Result};

use crate::cache_trait::DefinitionCache;

pub struct CachedDefiner<C, D> {
    cache: C,
    fallback: D,
}

impl<C, D> CachedDefiner<C, D>
where
    C: DefinitionCache,
    D: Definer,
{
    pub fn new(cache: C, fallback: D) -> Self {
        Self { cache, fallback }
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn fallback(&self) -> &D {
        &self.fallback
    }

    pub fn into_parts(self) -> (C, D) {
        (self.cache, self.fallback)
    }
}

impl<C, D> Definer for CachedDefiner<C, D>
where
    C: DefinitionCache,
    D: Definer,
{
    fn define(&self, word: &str) -> Result<Vec<Definition>> {
        let cached = self
            .cache
            .contains(word)
            .map_err(|e| e.during("check cache for", word))?;

        if cached {
            tracing::debug!(word, cache = self.cache.name(), "cache hit");
            return self
                .cache
                .lookup(word)
                .map_err(|e| e.during("look up cached definitions for", word));
        }

        tracing::debug!(word, cache = self.cache.name(), "cache miss");
        let defs = self
            .fallback
            .define(word)
            .map_err(|e| e.during("define", word))?;

        self.cache
            .save(word, &defs)
            .map_err(|e| e.during("cache definitions for", word))?;
        tracing::info!(word, definitions = defs.len(), "cached fetched definitions");

        Ok(defs)
    }
}
