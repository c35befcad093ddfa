//! Key-value stores the board persists into.
//!
//! The engine treats a store as opaque whole-value storage: it reads or
//! overwrites one serialized collection per key. Failures are reported as
//! [`BoardError::StoreUnavailable`] and absorbed by the persistence gateway.

use crate::error::{BoardError, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Synchronous key-value storage
pub trait KeyValueStore {
    /// Raw value under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Overwrite the value under `key`
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn has(&self, key: &str) -> Result<bool> {
        (**self).has(key)
    }
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value, e.g. a legacy collection
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Value under `key` as UTF-8, for inspection
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.values.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.values.contains_key(key))
    }
}

/// One file per key under a directory: `{root}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path backing `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.key_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => {
                trace!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BoardError::store(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.key_path(key)?;
        atomic_write(&path, value).map_err(|e| BoardError::store(key, e))
    }

    fn has(&self, key: &str) -> Result<bool> {
        Ok(self.key_path(key)?.is_file())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(BoardError::store(key, "key must match [A-Za-z0-9._-]+"))
    }
}

/// Atomic write via temp file and rename
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;

    // Rename (atomic on same filesystem)
    fs::rename(&temp_path, path)?;

    Ok(())
}
