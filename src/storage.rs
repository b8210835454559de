//! Persistent key-value storage
//!
//! This module provides:
//! - `KeyValueStore`, the raw string store capability
//! - `FileStore` (one JSON file per key) and `MemoryStore` backends
//! - `Storage`, a typed JSON layer on top of any backend

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

// ============================================
// Store capability
// ============================================

/// A durable string-keyed store.
///
/// Every call stands alone: there is no transaction spanning a read and a
/// later write.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> StorageResult<()>;
    fn keys(&self) -> StorageResult<Vec<String>>;
    /// Drop every entry in the store, not only the ones this crate wrote.
    fn clear(&self) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }
    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get_item(key)
    }
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set_item(key, value)
    }
    fn remove_item(&self, key: &str) -> StorageResult<()> {
        (**self).remove_item(key)
    }
    fn keys(&self) -> StorageResult<Vec<String>> {
        (**self).keys()
    }
    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }
}

// ============================================
// File backend
// ============================================

/// Stores each key as `<root>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{ENTRY_EXTENSION}", encode_key(key)))
    }

    /// Entry files under the root, paired with the key they hold.
    ///
    /// Files this store did not write (other extensions, names that are not
    /// a valid key encoding) are skipped.
    fn entries(&self) -> StorageResult<Vec<(String, PathBuf)>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_entry = path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION);
            if !is_entry {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|s| s.to_str()).and_then(decode_key) {
                entries.push((key, path));
            }
        }
        Ok(entries)
    }
}

const ENTRY_EXTENSION: &str = "json";

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.entry_path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes a sibling temp file and renames it over the entry, so a crash
    /// mid-write leaves the previous value intact.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        fs::create_dir_all(&self.root)?;
        let file_path = self.entry_path(key);
        let tmp_path = file_path.with_extension(format!("{ENTRY_EXTENSION}.tmp"));
        fs::write(&tmp_path, value)?;
        if let Err(err) = fs::rename(&tmp_path, &file_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let file_path = self.entry_path(key);
        if file_path.exists() {
            fs::remove_file(file_path)?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries()?.into_iter().map(|(key, _)| key).collect())
    }

    /// Removes every entry file. Anything else in the root is left alone.
    fn clear(&self) -> StorageResult<()> {
        for (_, path) in self.entries()? {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// File-name-safe, reversible key encoding.
///
/// ASCII alphanumerics and `-` are kept; every other byte (including `_`)
/// becomes `_XX` with two uppercase hex digits.
fn encode_key(key: &str) -> String {
    let mut encoded = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("_{byte:02X}"));
        }
    }
    encoded
}

fn decode_key(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'_' => {
                let hex = encoded.get(i + 1..i + 3)?;
                if !hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)) {
                    return None;
                }
                decoded.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b if b.is_ascii_alphanumeric() || b == b'-' => {
                decoded.push(b);
                i += 1;
            }
            _ => return None,
        }
    }
    String::from_utf8(decoded).ok()
}

// ============================================
// In-memory backend
// ============================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn clear(&self) -> StorageResult<()> {
        self.lock()?.clear();
        Ok(())
    }
}

// ============================================
// Typed JSON layer
// ============================================

/// JSON values over a `KeyValueStore`.
///
/// The caller names the expected type on every read, and stored content that
/// does not match it is an error rather than a silent default.
#[derive(Clone, Debug)]
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Serialize `value` and store it under `key`, replacing what was there.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let serialized = serde_json::to_string(value).map_err(StorageError::Serialization)?;
        tracing::debug!("storage: writing {} bytes to '{key}'", serialized.len());
        self.store
            .set_item(key, &serialized)
            .inspect_err(|err| tracing::error!("storage: failed to write '{key}': {err}"))
    }

    /// Read `key`, or `None` when nothing is stored there.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(raw) = self.store.get_item(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Deserialization {
                key: key.to_string(),
                source,
            })
            .inspect_err(|err| tracing::error!("storage: {err}"))
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        self.store.remove_item(key)
    }

    pub fn keys(&self) -> StorageResult<Vec<String>> {
        self.store.keys()
    }

    pub fn clear(&self) -> StorageResult<()> {
        tracing::debug!("storage: clearing all entries");
        self.store.clear()
    }
}
