//! Atomic replacement of small JSON files.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{DictError, Result};

/// How [`write_json_atomic`] lays out the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLayout {
    Compact,
    Pretty,
}

/// Serialize `value` to a temp file next to `path`, then rename it over
/// `path`. Readers see either the previous file or the complete new one.
/// The parent directory is created if it does not exist.
pub fn write_json_atomic<T>(path: &Path, value: &T, layout: JsonLayout) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| DictError::io(format!("create dir {:?}", dir), e))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| DictError::io(format!("create temp file in {:?}", dir), e))?;
    let written = match layout {
        JsonLayout::Compact => serde_json::to_writer(&mut tmp, value),
        JsonLayout::Pretty => serde_json::to_writer_pretty(&mut tmp, value),
    };
    written.map_err(|e| DictError::io(format!("write {:?}", tmp.path()), e.into()))?;
    tmp.flush()
        .map_err(|e| DictError::io(format!("flush {:?}", tmp.path()), e))?;
    tmp.persist(path)
        .map_err(|e| DictError::io(format!("replace {:?}", path), e.error))?;
    Ok(())
}
