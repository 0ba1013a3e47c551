//! Small JSON file helpers shared by the settings and schedule stores.
//!
//! Writes go to a uniquely named sibling temporary file that is then renamed
//! over the target, so a crash mid-write never leaves a truncated state file
//! behind and two processes saving at once never share a temporary file.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Loads a JSON document, returning `None` when the file does not exist.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::io(path, e)),
    };

    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|e| Error::json(path, e))
}

/// Atomically replaces `path` with the JSON encoding of `value`.
pub(crate) fn store_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;

    let encoded = serde_json::to_vec_pretty(value).map_err(|e| Error::json(path, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    tmp.write_all(&encoded).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
