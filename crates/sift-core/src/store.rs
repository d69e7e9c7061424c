//! Store: the asynchronous key-value interface the repository persists through.
//!
//! The repository never talks to a concrete backend; it holds an
//! `Arc<dyn KeyValueStore>`. Two backends ship with the crate:
//!
//! - [`MemoryStore`] keeps everything in process (tests, previews).
//! - [`JsonFileStore`] keeps one JSON object on disk, the same shape the
//!   browser's local storage area holds.

use crate::error::StoreError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

/// A set of top-level keys and their JSON values.
pub type StoreMap = serde_json::Map<String, Value>;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch `keys`. Keys with no stored value are omitted from the result.
    async fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError>;

    /// Write every entry of `items` in one call. Keys not in `items` are left
    /// untouched.
    async fn set(&self, items: StoreMap) -> Result<(), StoreError>;
}

fn select(all: &StoreMap, keys: &[&str]) -> StoreMap {
    keys.iter()
        .filter_map(|key| all.get(*key).map(|value| (key.to_string(), value.clone())))
        .collect()
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<StoreMap>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, e.g. with records written by an older version.
    pub fn with_items(items: StoreMap) -> Self {
        Self { items: RwLock::new(items) }
    }

    /// Copy of everything currently stored.
    pub async fn snapshot(&self) -> StoreMap {
        self.items.read().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError> {
        Ok(select(&*self.items.read().await, keys))
    }

    async fn set(&self, items: StoreMap) -> Result<(), StoreError> {
        self.items.write().await.extend(items);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonFileStore
// ---------------------------------------------------------------------------

/// A single JSON object file. Writes go to a sibling temp file which is then
/// renamed over the original, so a failed write leaves the previous contents.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<StoreMap, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError> {
        let all = self.read_all().await?;
        Ok(select(&all, keys))
    }

    async fn set(&self, items: StoreMap) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut all = self.read_all().await?;
        all.extend(items);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(&all)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), keys = all.len(), "store: file written");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> StoreMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn memory_get_omits_absent_keys() {
        let store = MemoryStore::with_items(map(json!({ "categories": ["Tech"] })));
        let got = store.get(&["categories", "settings"]).await.unwrap();
        assert_eq!(got.len(), 1);
        assert_eq!(got["categories"], json!(["Tech"]));
    }

    #[tokio::test]
    async fn memory_set_leaves_other_keys() {
        let store = MemoryStore::with_items(map(json!({ "a": 1, "b": 2 })));
        store.set(map(json!({ "b": 3 }))).await.unwrap();
        assert_eq!(store.snapshot().await, map(json!({ "a": 1, "b": 3 })));
    }

    #[tokio::test]
    async fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        assert!(store.get(&["savedSearches"]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        JsonFileStore::new(&path)
            .set(map(json!({ "categories": ["News"], "settings": { "theme": "dark" } })))
            .await
            .unwrap();
        JsonFileStore::new(&path).set(map(json!({ "categories": ["Tech"] }))).await.unwrap();

        let got = JsonFileStore::new(&path).get(&["categories", "settings"]).await.unwrap();
        assert_eq!(got["categories"], json!(["Tech"]));
        assert_eq!(got["settings"], json!({ "theme": "dark" }));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let err = JsonFileStore::new(&path).get(&["categories"]).await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
