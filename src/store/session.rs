//! Session-scoped key-value storage.
//!
//! The history log lives in a small string-keyed store with session
//! lifetime. Two backends are provided: an in-memory map (with an optional
//! byte quota, so tests can exercise quota-exceeded writes) and a directory
//! of JSON files, one per key, written atomically.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

/// Errors from writing to a session store.
///
/// Writes are best-effort: callers treat a failed write as "save did not
/// happen" and retry later, never as a fatal fault.
#[derive(Debug)]
pub enum StoreWriteError {
    /// The store's capacity would be exceeded by this write.
    QuotaExceeded { used: usize, quota: usize },
    /// I/O error writing a backing file.
    IoError(PathBuf, io::Error),
    /// The key is not usable as a storage name.
    InvalidKey(String),
}

impl std::fmt::Display for StoreWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreWriteError::QuotaExceeded { used, quota } => {
                write!(f, "Storage quota exceeded ({} of {} bytes used)", used, quota)
            }
            StoreWriteError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
            StoreWriteError::InvalidKey(key) => {
                write!(f, "Invalid storage key: {}", key)
            }
        }
    }
}

impl std::error::Error for StoreWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreWriteError::IoError(_, e) => Some(e),
            _ => None,
        }
    }
}

/// A session-scoped key-value store.
///
/// Reads are infallible by policy: a backend that cannot produce a value
/// reports `None` and the caller falls back to defaults.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreWriteError>;
    fn remove(&mut self, key: &str);
}

/// In-memory store backed by a map.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once the total stored bytes would pass
    /// `quota`.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_bytes(&self) -> usize {
        self.values
            .iter()
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreWriteError> {
        if let Some(quota) = self.quota {
            let existing = self.values.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let used = self.used_bytes() - existing + key.len() + value.len();
            if used > quota {
                return Err(StoreWriteError::QuotaExceeded { used, quota });
            }
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed store: one `<key>.json` file per key under a session
/// directory, written atomically via temp file + rename.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Rejects keys that would escape the session directory.
    fn validate_key(key: &str) -> Result<(), StoreWriteError> {
        if key.is_empty()
            || key.contains('/')
            || key.contains('\\')
            || key.contains("..")
            || key.starts_with('.')
        {
            return Err(StoreWriteError::InvalidKey(key.to_string()));
        }
        Ok(())
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        if Self::validate_key(key).is_err() {
            return None;
        }
        match fs::read_to_string(self.key_path(key)) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!("Failed to read session key '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreWriteError> {
        Self::validate_key(key)?;

        fs::create_dir_all(&self.dir)
            .map_err(|e| StoreWriteError::IoError(self.dir.clone(), e))?;

        let path = self.key_path(key);
        let temp_path = path.with_extension("json.tmp");

        let mut file = File::create(&temp_path)
            .map_err(|e| StoreWriteError::IoError(temp_path.clone(), e))?;
        file.write_all(value.as_bytes())
            .map_err(|e| StoreWriteError::IoError(temp_path.clone(), e))?;
        file.sync_all()
            .map_err(|e| StoreWriteError::IoError(temp_path.clone(), e))?;

        // Rename to final path (atomic on most filesystems)
        fs::rename(&temp_path, &path).map_err(|e| StoreWriteError::IoError(path, e))?;

        Ok(())
    }

    fn remove(&mut self, key: &str) {
        if Self::validate_key(key).is_err() {
            return;
        }
        let _ = fs::remove_file(self.key_path(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemorySessionStore::new();
        assert!(store.get("history").is_none());

        store.set("history", "{\"entries\":[]}").unwrap();
        assert_eq!(store.get("history").unwrap(), "{\"entries\":[]}");

        store.remove("history");
        assert!(store.get("history").is_none());
    }

    #[test]
    fn test_memory_store_quota() {
        let mut store = MemorySessionStore::with_quota(16);
        store.set("k", "short").unwrap();

        let err = store.set("k2", "a value that is far too long").unwrap_err();
        assert!(matches!(err, StoreWriteError::QuotaExceeded { .. }));

        // The failed write left existing data intact.
        assert_eq!(store.get("k").unwrap(), "short");
        assert!(store.get("k2").is_none());
    }

    #[test]
    fn test_memory_store_quota_counts_replacement() {
        let mut store = MemorySessionStore::with_quota(16);
        store.set("key", "0123456789").unwrap();
        // Replacing a value frees its old bytes first.
        store.set("key", "9876543210").unwrap();
        assert_eq!(store.get("key").unwrap(), "9876543210");
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path());

        assert!(store.get("history").is_none());
        store.set("history", "{\"entries\":[]}").unwrap();
        assert_eq!(store.get("history").unwrap(), "{\"entries\":[]}");

        store.remove("history");
        assert!(store.get("history").is_none());
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path());

        store.set("log", "one").unwrap();
        store.set("log", "two").unwrap();
        assert_eq!(store.get("log").unwrap(), "two");

        // No leftover temp file from the atomic write.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("log.json")]);
    }

    #[test]
    fn test_file_store_rejects_bad_keys() {
        let dir = tempdir().unwrap();
        let mut store = FileSessionStore::new(dir.path());

        assert!(store.set("../evil", "x").is_err());
        assert!(store.set("", "x").is_err());
        assert!(store.set(".hidden", "x").is_err());
        assert!(store.get("../evil").is_none());
    }
}
