//! Client-side key-value persistence.
//!
//! DESIGN
//! ======
//! `KeyValueStore` plays the role a browser's local storage plays for a web
//! console: string keys, string values, synchronous access. Writes go through
//! `apply`, which takes a batch so related keys land together.
//!
//! `MemoryStore` backs tests and ephemeral sessions. `FileStore` keeps one JSON
//! object on disk and replaces it atomically (temp file + rename) per batch,
//! so a crash leaves either the old map or the new one, never a mix.

pub mod session_store;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("storage contents are not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// A single mutation within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Set { key: String, value: String },
    Remove { key: String },
}

impl StorageOp {
    #[must_use]
    pub fn set(key: &str, value: impl Into<String>) -> Self {
        Self::Set { key: key.to_owned(), value: value.into() }
    }

    #[must_use]
    pub fn remove(key: &str) -> Self {
        Self::Remove { key: key.to_owned() }
    }
}

pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Apply every op in `ops` as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be written; in that case none
    /// of its ops are visible.
    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// See [`KeyValueStore::apply`].
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.apply(&[StorageOp::set(key, value)])
    }

    /// # Errors
    ///
    /// See [`KeyValueStore::apply`].
    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.apply(&[StorageOp::remove(key)])
    }
}

fn apply_ops(map: &mut BTreeMap<String, String>, ops: &[StorageOp]) {
    for op in ops {
        match op {
            StorageOp::Set { key, value } => {
                map.insert(key.clone(), value.clone());
            }
            StorageOp::Remove { key } => {
                map.remove(key);
            }
        }
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every entry, for inspection.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        apply_ops(&mut entries, ops);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(StorageError::Io { path: self.path.clone(), source }),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
        }

        let rendered = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, rendered).map_err(|source| StorageError::Io { path: tmp.clone(), source })?;
        fs::rename(&tmp, &self.path).map_err(|source| StorageError::Io { path: self.path.clone(), source })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut map = self.read_map()?;
        Ok(map.remove(key))
    }

    fn apply(&self, ops: &[StorageOp]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map()?;
        apply_ops(&mut map, ops);
        tracing::debug!(path = %self.path.display(), ops = ops.len(), "storage batch written");
        self.write_map(&map)
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
