//! Durable storage for the clinic directory envelope
//!
//! `Persistence` turns a byte-oriented [`KeyValueStore`] into a best-effort
//! envelope store: writes never fail from the caller's point of view, and
//! anything that cannot be read back as a current-schema envelope is
//! reported as absent.

use async_trait::async_trait;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::fs;

use super::envelope::{CacheEnvelope, EnvelopeError};

/// Key/value byte storage that survives process restarts
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the bytes stored under `key`, or `None` if nothing is stored
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value
    async fn put(&self, key: &str, value: &[u8]) -> io::Result<()>;

    /// Removes `key`. Removing a missing key succeeds.
    async fn delete(&self, key: &str) -> io::Result<()>;
}

/// Stores each key as a JSON file in a cache directory
///
/// The default location is the XDG cache directory (`~/.cache/zestwell/` on
/// Linux). The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "zestwell")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a FileStore rooted at a custom directory
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Directory the store writes into
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        match fs::read(self.cache_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;
        fs::write(self.cache_path(key), value).await
    }

    async fn delete(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.cache_path(key)).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

/// Process-local store, used when no cache directory is available and in tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> io::Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Errors from the underlying store or envelope codec
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Storage I/O failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Envelope could not be encoded or decoded
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

/// Best-effort envelope storage on top of a [`KeyValueStore`]
#[derive(Clone)]
pub struct Persistence {
    store: Arc<dyn KeyValueStore>,
}

impl Persistence {
    /// Wraps a key/value store
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Persistence in the XDG cache directory, or in memory if there is none
    pub fn default_location() -> Self {
        match FileStore::new() {
            Some(store) => Self::new(store),
            None => {
                tracing::warn!("no cache directory available, directory cache will not persist");
                Self::new(MemoryStore::new())
            }
        }
    }

    /// Writes an envelope under `key`
    ///
    /// Failures are logged and swallowed: the in-memory result is what the
    /// current session uses, persistence only helps the next one.
    pub async fn write(&self, key: &str, envelope: &CacheEnvelope) {
        if let Err(e) = self.try_write(key, envelope).await {
            tracing::warn!(key, error = %e, "failed to persist directory cache");
        }
    }

    /// Reads the envelope stored under `key`
    ///
    /// # Returns
    /// * `Some(CacheEnvelope)` if a current-schema envelope is stored
    /// * `None` if the key is missing, the read fails, or the payload is corrupt
    pub async fn read(&self, key: &str) -> Option<CacheEnvelope> {
        match self.try_read(key).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable directory cache");
                None
            }
        }
    }

    /// Removes the envelope stored under `key`. Clearing a missing key is not an error.
    pub async fn clear(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(key, error = %e, "failed to clear directory cache");
        }
    }

    async fn try_write(&self, key: &str, envelope: &CacheEnvelope) -> Result<(), PersistenceError> {
        let bytes = envelope.encode()?;
        self.store.put(key, &bytes).await?;
        tracing::debug!(key, records = envelope.records.len(), "directory cache written");
        Ok(())
    }

    async fn try_read(&self, key: &str) -> Result<Option<CacheEnvelope>, PersistenceError> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };
        Ok(Some(CacheEnvelope::decode(&bytes)?))
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::default_records;
    use chrono::Utc;
    use tempfile::TempDir;

    const KEY: &str = "test-clinics";

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path());
        (store, temp_dir)
    }

    fn sample_envelope() -> CacheEnvelope {
        CacheEnvelope::new(default_records(), Utc::now())
    }

    /// Store whose every operation fails, for exercising the swallow paths
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> io::Result<Option<Vec<u8>>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        async fn put(&self, _key: &str, _value: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "quota exceeded"))
        }

        async fn delete(&self, _key: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[tokio::test]
    async fn test_file_store_put_creates_file_in_cache_directory() {
        let (store, temp_dir) = create_test_store();

        store.put("test_key", b"{\"value\":42}").await.expect("Put should succeed");

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Cache file should exist");
        let content = std::fs::read_to_string(&expected_path).expect("Should read file");
        assert_eq!(content, "{\"value\":42}");
    }

    #[tokio::test]
    async fn test_file_store_get_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();

        let result = store.get("nonexistent_key").await.expect("Get should succeed");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[tokio::test]
    async fn test_file_store_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let store = FileStore::with_dir(nested_path.clone());

        store.put("nested_key", b"[]").await.expect("Put should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists(), "Cache file should exist");
    }

    #[tokio::test]
    async fn test_file_store_delete_is_idempotent() {
        let (store, temp_dir) = create_test_store();
        store.put("gone", b"1").await.unwrap();

        store.delete("gone").await.expect("First delete should succeed");
        store.delete("gone").await.expect("Deleting a missing key should succeed");

        assert!(!temp_dir.path().join("gone.json").exists());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = FileStore::new() {
            let path_str = store.dir().to_string_lossy();
            assert!(
                path_str.contains("zestwell"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip_and_delete() {
        let store = MemoryStore::new();

        store.put("k", b"abc").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"abc".to_vec()));

        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persistence_write_then_read() {
        let (store, _temp_dir) = create_test_store();
        let persistence = Persistence::new(store);
        let envelope = sample_envelope();

        persistence.write(KEY, &envelope).await;
        let read = persistence.read(KEY).await.expect("Envelope should be stored");

        // Timestamps round to the millisecond on disk
        assert_eq!(read.records, envelope.records);
        assert_eq!(
            read.captured_at.timestamp_millis(),
            envelope.captured_at.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn test_persistence_overwrites_existing_envelope() {
        let persistence = Persistence::new(MemoryStore::new());

        persistence.write(KEY, &sample_envelope()).await;
        let smaller = CacheEnvelope::new(default_records()[..1].to_vec(), Utc::now());
        persistence.write(KEY, &smaller).await;

        let read = persistence.read(KEY).await.unwrap();
        assert_eq!(read.records.len(), 1, "Cache should contain latest envelope");
    }

    #[tokio::test]
    async fn test_persistence_read_treats_corrupt_payload_as_absent() {
        let (store, temp_dir) = create_test_store();
        std::fs::write(temp_dir.path().join(format!("{}.json", KEY)), "{ truncated").unwrap();

        let persistence = Persistence::new(store);

        assert!(persistence.read(KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_persistence_read_treats_old_schema_as_absent() {
        let store = MemoryStore::new();
        store
            .put(KEY, br#"{"schema_version": 0, "captured_at": 0, "records": []}"#)
            .await
            .unwrap();

        let persistence = Persistence::new(store);

        assert!(persistence.read(KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_persistence_swallows_store_failures() {
        let persistence = Persistence::new(BrokenStore);

        persistence.write(KEY, &sample_envelope()).await;
        assert!(persistence.read(KEY).await.is_none());
        persistence.clear(KEY).await;
    }

    #[tokio::test]
    async fn test_persistence_clear_removes_envelope() {
        let persistence = Persistence::new(MemoryStore::new());
        persistence.write(KEY, &sample_envelope()).await;

        persistence.clear(KEY).await;
        persistence.clear(KEY).await;

        assert!(persistence.read(KEY).await.is_none());
    }
}
