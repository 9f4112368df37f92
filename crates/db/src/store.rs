//! Keyed JSON document storage.
//!
//! Every collection (the project list, one upload list per project) is a
//! single JSON array stored under a string key. [`Store`] serializes
//! read-modify-write cycles behind an async mutex so concurrent requests
//! in one process cannot overwrite each other's changes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

/// Errors from the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the underlying medium failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be encoded or decoded.
    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Raw key/value access to JSON documents.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Fetch the document stored under `key`, or `None` if absent.
    async fn read(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the document stored under `key`.
    async fn write(&self, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Delete the document under `key`. Returns `true` if it existed.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// File backend
// ---------------------------------------------------------------------------

/// Stores each document as `<dir>/<key>.json`, pretty-printed.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Use `dir` as the data directory, creating it if missing.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Opened document directory");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DocumentBackend for FileBackend {
    async fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match tokio::fs::read(self.path_for(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(doc)?;
        let path = self.path_for(key);
        // Write then rename so readers never see a half-written document.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let meta = tokio::fs::metadata(&self.dir).await?;
        if meta.permissions().readonly() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{} is read-only", self.dir.display()),
            )
            .into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Memory backend
// ---------------------------------------------------------------------------

/// Volatile backend for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryBackend {
    docs: RwLock<HashMap<String, Value>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn read(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.docs.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, doc: &Value) -> Result<(), StoreError> {
        self.docs.write().await.insert(key.to_string(), doc.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.docs.write().await.remove(key).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Typed collection access over a [`DocumentBackend`].
///
/// Cheaply cloneable; clones share the backend and the write lock.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn DocumentBackend>,
    write_lock: Arc<Mutex<()>>,
}

impl Store {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// A store backed by a fresh [`MemoryBackend`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Load every record in a collection. A missing document is an empty
    /// collection.
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        match self.backend.read(key).await? {
            Some(doc) => Ok(serde_json::from_value(doc)?),
            None => Ok(Vec::new()),
        }
    }

    /// Apply `f` to a collection and persist the result atomically with
    /// respect to other `modify` calls on this store.
    pub async fn modify<T, R, F>(&self, key: &str, f: F) -> Result<R, StoreError>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> R + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<T> = self.load(key).await?;
        let result = f(&mut records);
        self.backend
            .write(key, &serde_json::to_value(&records)?)
            .await?;
        Ok(result)
    }

    /// Like [`Store::modify`], but `f` reports whether it changed anything.
    /// `None` leaves the stored document untouched, so a collection that
    /// was dropped meanwhile is not written back.
    pub async fn try_modify<T, R, F>(&self, key: &str, f: F) -> Result<Option<R>, StoreError>
    where
        T: Serialize + DeserializeOwned + Send,
        R: Send,
        F: FnOnce(&mut Vec<T>) -> Option<R> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<T> = self.load(key).await?;
        let Some(result) = f(&mut records) else {
            return Ok(None);
        };
        self.backend
            .write(key, &serde_json::to_value(&records)?)
            .await?;
        Ok(Some(result))
    }

    /// Delete a whole collection. Returns `true` if it existed.
    pub async fn drop_collection(&self, key: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove(key).await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.backend.ping().await
    }
}
