//! JsonMapCache: definition cache backed by a single JSON file.
//!
//! Format: `{ "word": [Definition, ...], ... }` keyed by normalized word.
//! A missing file is an empty cache. Every operation reads the file, and
//! `save` does read-modify-write under an in-process lock, then renames a
//! temp file over the original.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use termdict_core::{normalize, write_json_atomic, DictError, Definition, JsonLayout, Result};

use crate::cache_trait::{key_for_save, DefinitionCache};

type Entries = BTreeMap<String, Vec<Definition>>;

pub struct JsonMapCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonMapCache {
    /// Use `path` as the cache file. Its parent directory is created if needed;
    /// the file itself is created on first save.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| DictError::io(format!("create cache dir {:?}", parent), e))?;
        }
        Ok(Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of cached words.
    pub fn len(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    fn load(&self) -> Result<Entries> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(DictError::io(format!("open {:?}", self.path), e)),
        };
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| DictError::corrupt(format!("{:?}", self.path), e))
    }

    fn store(&self, entries: &Entries) -> Result<()> {
        write_json_atomic(&self.path, entries, JsonLayout::Pretty)
    }
}

impl DefinitionCache for JsonMapCache {
    fn contains(&self, word: &str) -> Result<bool> {
        Ok(self.load()?.contains_key(&normalize(word)))
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        let key = normalize(word);
        self.load()?
            .remove(&key)
            .ok_or_else(|| DictError::not_found(key))
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        let key = key_for_save(word)?;
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        entries.insert(key, defs.to_vec());
        self.store(&entries)
    }

    fn name(&self) -> &str {
        "JsonMapCache"
    }
}
