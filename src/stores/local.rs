use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::DEFAULT_FALLBACK_QUOTA_BYTES;
use crate::error::StoreError;
use crate::tier::FallbackTier;

const TIER: &str = "local";

/// Configuration for LocalStorage.
#[derive(Debug, Clone)]
pub struct LocalStorageConfig {
    /// Total bytes (keys plus values) the store accepts before rejecting writes.
    pub quota_bytes: usize,

    /// Optional file the entries are written through to.
    ///
    /// The file holds a flat JSON object mapping keys to values. When `None`,
    /// entries only live for the life of the process.
    pub path: Option<PathBuf>,
}

impl Default for LocalStorageConfig {
    fn default() -> Self {
        LocalStorageConfig {
            quota_bytes: DEFAULT_FALLBACK_QUOTA_BYTES,
            path: None,
        }
    }
}

struct State {
    entries: BTreeMap<String, String>,
    used_bytes: usize,
}

/// Small-capacity synchronous fallback tier.
///
/// Entries are kept in a `BTreeMap` behind a std `RwLock`, so access never
/// suspends. The summed size of all keys and values is capped at
/// `quota_bytes`; a write that would cross it fails with
/// [`StoreError::QuotaExceeded`] and leaves the store unchanged.
///
/// When file-backed, every mutation rewrites the whole file before the
/// in-memory state is updated, so a failed write leaves both unchanged.
pub struct LocalStorage {
    state: RwLock<State>,
    quota_bytes: usize,
    path: Option<PathBuf>,
}

impl LocalStorage {
    /// Create a new in-memory LocalStorage.
    pub fn new(config: LocalStorageConfig) -> Self {
        LocalStorage {
            state: RwLock::new(State {
                entries: BTreeMap::new(),
                used_bytes: 0,
            }),
            quota_bytes: config.quota_bytes,
            path: config.path,
        }
    }

    /// Create an in-memory LocalStorage with the given quota.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self::new(LocalStorageConfig {
            quota_bytes,
            path: None,
        })
    }

    /// Open a file-backed LocalStorage, loading any entries already in the file.
    ///
    /// A missing file is treated as an empty store.
    pub fn open(path: impl AsRef<Path>, quota_bytes: usize) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries: BTreeMap<String, String> = match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).map_err(|e| {
                StoreError::Serialization(format!("{}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(StoreError::connection(
                    TIER,
                    format!("read {}: {}", path.display(), e),
                ));
            }
        };
        let used_bytes = entries.iter().map(|(k, v)| k.len() + v.len()).sum();

        tracing::debug!(
            "Opened local storage: path={}, keys={}, used_bytes={}",
            path.display(),
            entries.len(),
            used_bytes
        );

        Ok(LocalStorage {
            state: RwLock::new(State {
                entries,
                used_bytes,
            }),
            quota_bytes,
            path: Some(path),
        })
    }

    /// Bytes currently counted against the quota.
    pub fn used_bytes(&self) -> usize {
        self.read().map(|state| state.used_bytes).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::unavailable(TIER))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::unavailable(TIER))
    }

    /// Write `entries` through to the backing file, if any.
    fn persist(&self, key: &str, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        let data = serde_json::to_string(entries)
            .map_err(|e| StoreError::Serialization(format!("Serialization failed: {}", e)))?;
        fs::write(path, data).map_err(|e| {
            StoreError::transaction(TIER, key, format!("write {}: {}", path.display(), e))
        })
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(LocalStorageConfig::default())
    }
}

impl FallbackTier for LocalStorage {
    fn name(&self) -> &'static str {
        TIER
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read()?.entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;

        let previous = state.entries.get(key).map_or(0, |v| key.len() + v.len());
        let requested = state.used_bytes - previous + key.len() + value.len();
        if requested > self.quota_bytes {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                requested,
                quota: self.quota_bytes,
            });
        }

        if self.path.is_some() {
            let mut next = state.entries.clone();
            next.insert(key.to_string(), value.to_string());
            self.persist(key, &next)?;
            state.entries = next;
        } else {
            state.entries.insert(key.to_string(), value.to_string());
        }
        state.used_bytes = requested;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.write()?;

        let Some(value) = state.entries.get(key) else {
            return Ok(());
        };
        let freed = key.len() + value.len();

        if self.path.is_some() {
            let mut next = state.entries.clone();
            next.remove(key);
            self.persist(key, &next)?;
            state.entries = next;
        } else {
            state.entries.remove(key);
        }
        state.used_bytes -= freed;
        Ok(())
    }

    fn len(&self) -> usize {
        self.read().map(|state| state.entries.len()).unwrap_or(0)
    }

    fn key(&self, index: usize) -> Option<String> {
        self.read().ok()?.entries.keys().nth(index).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.read()
            .map(|state| state.entries.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_remove() {
        let store = LocalStorage::default();

        assert!(store.get_item("doc-1").unwrap().is_none());

        store.set_item("doc-1", "one").unwrap();
        assert_eq!(store.get_item("doc-1").unwrap().as_deref(), Some("one"));
        assert_eq!(store.used_bytes(), "doc-1".len() + "one".len());

        store.set_item("doc-1", "three").unwrap();
        assert_eq!(store.used_bytes(), "doc-1".len() + "three".len());

        store.remove_item("doc-1").unwrap();
        assert!(store.get_item("doc-1").unwrap().is_none());
        assert_eq!(store.used_bytes(), 0);

        // Removing an absent key is a no-op
        store.remove_item("doc-1").unwrap();
    }

    #[test]
    fn test_quota_rejects_and_leaves_store_unchanged() {
        let store = LocalStorage::with_quota(16);
        store.set_item("a", "1234").unwrap();

        let err = store.set_item("b", "x".repeat(64).as_str()).unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(store.get_item("b").unwrap().is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.used_bytes(), 5);
    }

    #[test]
    fn test_overwrite_counts_only_the_new_value() {
        // 1 + 9 = 10 bytes fits; replacing it with another 10-byte entry must too
        let store = LocalStorage::with_quota(10);
        store.set_item("k", "123456789").unwrap();
        store.set_item("k", "987654321").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("987654321"));
    }

    #[test]
    fn test_indexed_enumeration() {
        let store = LocalStorage::default();
        store.set_item("b", "2").unwrap();
        store.set_item("a", "1").unwrap();

        assert_eq!(store.len(), 2);
        let keys: Vec<String> = (0..store.len()).filter_map(|i| store.key(i)).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
        assert!(store.key(2).is_none());

        // Bulk listing agrees with positional enumeration
        assert_eq!(store.keys(), keys);
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");

        {
            let store = LocalStorage::open(&path, 1024).unwrap();
            assert!(store.is_empty());
            store.set_item("chathtml-code", "<html>OLD</html>").unwrap();
            store.set_item("scratch", "tmp").unwrap();
            store.remove_item("scratch").unwrap();
        }

        let on_disk: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk["chathtml-code"], "<html>OLD</html>");

        let reopened = LocalStorage::open(&path, 1024).unwrap();
        assert_eq!(
            reopened.get_item("chathtml-code").unwrap().as_deref(),
            Some("<html>OLD</html>")
        );
        assert_eq!(reopened.used_bytes(), "chathtml-code".len() + "<html>OLD</html>".len());
    }

    #[test]
    fn test_corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.json");
        fs::write(&path, "{not json").unwrap();

        let err = LocalStorage::open(&path, 1024).err().unwrap();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
