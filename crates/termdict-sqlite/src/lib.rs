//! SqliteStore: one SQLite database holding both the definition cache and
//! the vocab list.
//!
//! Tables: `words(id, word)` with one row per cached word, `definitions`
//! holding that word's senses in insertion order, and `vocab(word)`. The
//! schema ships inside the binary as numbered SQL files; `PRAGMA
//! user_version` records how many have been applied.
//!
//! The connection sits behind a mutex, so every operation on a store is
//! serialized. Separate processes coordinate through SQLite's own locking,
//! with a busy timeout instead of failing straight away.

use std::path::Path;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use termdict_cache::{key_for_save, DefinitionCache};
use termdict_core::{normalize, DictError, Definition, Result};
use termdict_vocab::VocabRepo;

/// Embedded migrations, applied in order. Index `i` moves the schema from
/// version `i` to `i + 1`.
const MIGRATIONS: &[&str] = &[include_str!("../migrations/0001_init.sql")];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SqliteStore {
    conn: Mutex<Connection>,
    location: String,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and bring its schema up to date.
    /// The parent directory is created if needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DictError::io(format!("create dir {:?}", parent), e))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| DictError::database(format!("open database {:?}", path), e))?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(|e| DictError::database("enable write-ahead log", e))?;
        Self::init(conn, format!("{:?}", path))
    }

    /// A private in-memory database, gone when the store is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DictError::database("open in-memory database", e))?;
        Self::init(conn, ":memory:".to_string())
    }

    fn init(mut conn: Connection, location: String) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| DictError::database("set busy timeout", e))?;
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| DictError::database("enable foreign key constraints", e))?;

        let applied = migrate(&mut conn)?;
        tracing::debug!(
            db = %location,
            applied,
            version = MIGRATIONS.len(),
            "sqlite store ready"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            location,
        })
    }

    /// Where the database lives, for logging.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Number of migrations recorded as applied.
    pub fn schema_version(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let version = user_version(&conn)?;
        Ok(version as usize)
    }
}

// ─── Migrations ───────────────────────────────────────────────────

fn user_version(conn: &Connection) -> Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| DictError::database("read schema version", e))
}

/// Apply every migration newer than the database's `user_version` in one
/// transaction. Returns how many ran.
fn migrate(conn: &mut Connection) -> Result<usize> {
    let current = user_version(conn)?;
    if current < 0 || current as usize > MIGRATIONS.len() {
        return Err(DictError::database(
            "check schema version",
            format!(
                "database is at version {}, this build knows {}",
                current,
                MIGRATIONS.len()
            ),
        ));
    }
    let current = current as usize;
    if current == MIGRATIONS.len() {
        return Ok(0);
    }

    let tx = conn
        .transaction()
        .map_err(|e| DictError::database("begin migration", e))?;
    for (idx, sql) in MIGRATIONS.iter().enumerate().skip(current) {
        let version = idx + 1;
        tx.execute_batch(sql)
            .map_err(|e| DictError::database(format!("apply migration {}", version), e))?;
        tx.pragma_update(None, "user_version", version as i64)
            .map_err(|e| DictError::database(format!("record migration {}", version), e))?;
    }
    tx.commit()
        .map_err(|e| DictError::database("commit migrations", e))?;
    Ok(MIGRATIONS.len() - current)
}

// ─── DefinitionCache ──────────────────────────────────────────────

impl DefinitionCache for SqliteStore {
    fn contains(&self, word: &str) -> Result<bool> {
        let word = normalize(word);
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM words WHERE word = ?1)",
            params![word],
            |row| row.get(0),
        )
        .map_err(|e| DictError::database(format!("query word '{}'", word), e))
    }

    fn lookup(&self, word: &str) -> Result<Vec<Definition>> {
        let word = normalize(word);
        let conn = self.conn.lock();

        let id: Option<i64> = conn
            .query_row("SELECT id FROM words WHERE word = ?1", params![word], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| DictError::database(format!("query word '{}'", word), e))?;
        let Some(id) = id else {
            return Err(DictError::not_found(word));
        };

        let mut stmt = conn
            .prepare_cached(
                "SELECT part_of_speech, definition FROM definitions WHERE word_id = ?1 ORDER BY id",
            )
            .map_err(|e| DictError::database("prepare definitions query", e))?;
        let rows = stmt
            .query_map(params![id], |row| {
                Ok(Definition::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| DictError::database(format!("query definitions for '{}'", word), e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DictError::database(format!("read definitions for '{}'", word), e))
    }

    fn save(&self, word: &str, defs: &[Definition]) -> Result<()> {
        let key = key_for_save(word)?;
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| DictError::database("begin transaction", e))?;

        // Replacing the word row drops its old senses through the cascade.
        tx.execute("DELETE FROM words WHERE word = ?1", params![key])
            .map_err(|e| DictError::database(format!("clear word '{}'", key), e))?;
        tx.execute("INSERT INTO words (word) VALUES (?1)", params![key])
            .map_err(|e| DictError::database(format!("insert word '{}'", key), e))?;
        let word_id = tx.last_insert_rowid();
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO definitions (word_id, definition, part_of_speech) VALUES (?1, ?2, ?3)",
                )
                .map_err(|e| DictError::database("prepare definition insert", e))?;
            for def in defs {
                stmt.execute(params![word_id, def.meaning, def.part_of_speech])
                    .map_err(|e| {
                        DictError::database(format!("insert definition for '{}'", key), e)
                    })?;
            }
        }
        tx.commit()
            .map_err(|e| DictError::database(format!("commit definitions for '{}'", key), e))?;

        tracing::trace!(word = %key, senses = defs.len(), "definitions stored in sqlite");
        Ok(())
    }

    fn name(&self) -> &str {
        "SqliteStore"
    }
}

// ─── VocabRepo ────────────────────────────────────────────────────

impl SqliteStore {
    /// Run `sql` once per normalized, non-blank word inside one transaction.
    /// Returns the words for which a row changed, in request order.
    fn change_vocab(&self, sql: &str, what: &str, words: &[String]) -> Result<Vec<String>> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| DictError::database("begin transaction", e))?;

        let mut changed = Vec::new();
        {
            let mut stmt = tx
                .prepare(sql)
                .map_err(|e| DictError::database(format!("prepare {}", what), e))?;
            for word in words {
                let word = normalize(word);
                if word.is_empty() {
                    continue;
                }
                let rows = stmt
                    .execute(params![word])
                    .map_err(|e| DictError::database(format!("{} '{}'", what, word), e))?;
                if rows == 1 {
                    changed.push(word);
                }
            }
        }
        tx.commit()
            .map_err(|e| DictError::database(format!("commit {}", what), e))?;

        if !changed.is_empty() {
            tracing::debug!(db = %self.location, changed = changed.len(), "vocab list updated");
        }
        Ok(changed)
    }
}

impl VocabRepo for SqliteStore {
    fn add_words(&self, words: &[String]) -> Result<Vec<String>> {
        self.change_vocab(
            "INSERT INTO vocab (word) VALUES (?1) ON CONFLICT DO NOTHING",
            "add vocab word",
            words,
        )
    }

    fn remove_words(&self, words: &[String]) -> Result<Vec<String>> {
        self.change_vocab("DELETE FROM vocab WHERE word = ?1", "remove vocab word", words)
    }

    fn list_words(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT word FROM vocab ORDER BY word")
            .map_err(|e| DictError::database("prepare vocab query", e))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| DictError::database("query vocab list", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| DictError::database("read vocab list", e))
    }
}
