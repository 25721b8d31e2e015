//! FileCache: one JSON file per word in a cache directory.
//!
//! `<dir>/<escaped word>.json` holds the word's definitions as a JSON array.
//! Words are normalized first; any byte outside `[a-z0-9_-]` is written as
//! `%XX`, so every word maps to exactly one flat file name. Stems longer
//! than [`MAX_STEM_LEN`] are cut and suffixed with `~` and an xxHash64 of
//! the full key, which keeps names under the usual 255-byte limit.
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so a concurrent reader sees either the old entry or the new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use termdict_core::{normalize, write_json_atomic, DictError, Definition, JsonLayout, Result};
use twox_hash::XxHash64;

use crate::cache_trait::{key_for_save, DefinitionCache};

pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Open a cache rooted at `dir`, creating the directory if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| DictError::io(format!("create cache dir {:?}", dir), e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cache file for a word (normalized here).
    pub fn path_for(&self, word: &str) -> PathBuf {
        self.dir
            .join(format!("{}.json", escape_file_stem(&normalize(word))))
    }
}

impl DefinitionCache for FileCache {
    fn contains(&self, word: &str) -> Result<bool> {
        let path = self.path_for(word);
        path.try_exists()
            .map_err(|e| DictError::io(format!("stat {:?}", path), e))
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        let path = self.path_for(word);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(DictError::not_found(normalize(word)));
            }
            Err(e) => return Err(DictError::io(format!("read {:?}", path), e)),
        };
        serde_json::from_str(&content).map_err(|e| DictError::corrupt(format!("{:?}", path), e))
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        let key = key_for_save(word)?;
        let path = self.path_for(&key);

        write_json_atomic(&path, defs, JsonLayout::Compact)?;

        tracing::trace!(word = %key, path = ?path, "cache file written");
        Ok(())
    }

    fn name(&self) -> &str {
        "FileCache"
    }
}

// ─── Helpers ──────────────────────────────────────────────────────

/// Bytes kept verbatim in a file stem; everything else becomes `%XX`.
/// Uppercase never reaches here because keys are normalized first.
const STEM_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_');

/// Longest escaped stem written as-is.
pub const MAX_STEM_LEN: usize = 200;

/// Length of the readable prefix kept in front of a hashed stem.
const HASHED_PREFIX_LEN: usize = 160;

/// Escape a normalized word into a safe, flat file stem.
fn escape_file_stem(word: &str) -> String {
    let escaped = utf8_percent_encode(word, STEM_SET).to_string();
    if escaped.len() <= MAX_STEM_LEN {
        return escaped;
    }

    // The escaped form is ASCII, so any byte index is a char boundary. Back
    // off so the prefix never ends inside a `%XX` triple.
    let mut cut = HASHED_PREFIX_LEN;
    if let Some(pct) = escaped[cut - 2..cut].rfind('%') {
        cut = cut - 2 + pct;
    }
    format!(
        "{}~{:016x}",
        &escaped[..cut],
        XxHash64::oneshot(0, word.as_bytes())
    )
}
