//! Runtime settings: command-line flags layered over `config.json` in the
//! data directory, layered over built-in defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use termdict_cache::{DefinitionCache, FileCache, JsonMapCache, MemoryCache};
use termdict_sqlite::SqliteStore;
use termdict_vocab::{FileVocabRepo, VocabRepo};

pub const APP_NAME: &str = "termdict";
const CONFIG_FILE: &str = "config.json";
const VOCAB_FILE: &str = "vocab.json";
const CACHE_DIR: &str = "cache";
const CACHE_MAP_FILE: &str = "cache.json";
const DATABASE_FILE: &str = "termdict.db";

/// Where looked-up definitions are kept between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// One JSON file per word under `<data dir>/cache/`
    #[default]
    File,
    /// A single `<data dir>/cache.json` map
    Json,
    /// Nothing persisted; every run asks the dictionary service again
    Memory,
    /// `<data dir>/termdict.db`, which then also holds the vocab list
    Sqlite,
}

/// The storage a run works against.
pub struct Stores {
    pub cache: Box<dyn DefinitionCache>,
    pub vocab: Box<dyn VocabRepo>,
}

/// Contents of `config.json`. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub cache: CacheBackend,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            api_url: termdict_api::DEFAULT_BASE_URL.to_string(),
            timeout_secs: termdict_api::DEFAULT_TIMEOUT.as_secs(),
            cache: CacheBackend::File,
        }
    }
}

impl FileConfig {
    /// Read `config.json` from `data_dir`. A missing or unreadable file falls
    /// back to defaults with a warning rather than failing the command.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<FileConfig>(&content) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config {:?}, using defaults: {}", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

/// Command-line overrides; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub cache: Option<CacheBackend>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub api_url: String,
    pub timeout: Duration,
    pub cache: CacheBackend,
}

impl Settings {
    pub fn resolve(overrides: &Overrides) -> anyhow::Result<Self> {
        let data_dir = match &overrides.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir()?,
        };
        let file = FileConfig::load(&data_dir);

        let timeout_secs = overrides.timeout_secs.unwrap_or(file.timeout_secs);
        let timeout = if timeout_secs == 0 {
            tracing::warn!(
                "timeout_secs = 0 would fail every request, using {}s",
                termdict_api::DEFAULT_TIMEOUT.as_secs()
            );
            termdict_api::DEFAULT_TIMEOUT
        } else {
            Duration::from_secs(timeout_secs)
        };

        Ok(Self {
            api_url: overrides.api_url.clone().unwrap_or(file.api_url),
            timeout,
            cache: overrides.cache.unwrap_or(file.cache),
            data_dir,
        })
    }

    pub fn vocab_path(&self) -> PathBuf {
        self.data_dir.join(VOCAB_FILE)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    /// Open the configured cache backend and the vocab list. The SQLite
    /// backend keeps both in one database; every other backend pairs with
    /// `vocab.json`.
    pub fn open_stores(&self) -> anyhow::Result<Stores> {
        let (cache, vocab): (Box<dyn DefinitionCache>, Box<dyn VocabRepo>) = match self.cache {
            CacheBackend::File => {
                let dir = self.data_dir.join(CACHE_DIR);
                let cache = FileCache::new(&dir).with_context(|| format!("open cache {:?}", dir))?;
                (Box::new(cache) as Box<dyn DefinitionCache>, self.file_vocab())
            }
            CacheBackend::Json => {
                let path = self.data_dir.join(CACHE_MAP_FILE);
                let cache =
                    JsonMapCache::new(&path).with_context(|| format!("open cache {:?}", path))?;
                (Box::new(cache) as Box<dyn DefinitionCache>, self.file_vocab())
            }
            CacheBackend::Memory => (
                Box::new(MemoryCache::new()) as Box<dyn DefinitionCache>,
                self.file_vocab(),
            ),
            CacheBackend::Sqlite => {
                let path = self.database_path();
                let store = Arc::new(
                    SqliteStore::open(&path).with_context(|| format!("open database {:?}", path))?,
                );
                let vocab: Box<dyn VocabRepo> = Box::new(Arc::clone(&store));
                (Box::new(store) as Box<dyn DefinitionCache>, vocab)
            }
        };
        tracing::debug!(backend = cache.name(), "definition cache ready");
        Ok(Stores { cache, vocab })
    }

    fn file_vocab(&self) -> Box<dyn VocabRepo> {
        Box::new(FileVocabRepo::new(&self.vocab_path()))
    }
}

/// `$XDG_DATA_HOME/termdict`, else `$HOME/.local/share/termdict`.
fn default_data_dir() -> anyhow::Result<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(xdg).join(APP_NAME));
    }
    let home = std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("cannot determine data directory; set --data-dir or TERMDICT_HOME"))?;
    Ok(PathBuf::from(home).join(".local").join("share").join(APP_NAME))
}
