//! FailingStore, a [`KeyValueStore`] whose reads or writes can be made to
//! reject, for exercising store-failure propagation.
//!
//! Wraps a [`MemoryStore`] so the test can check that a rejected write left
//! the previously committed state untouched.

use async_trait::async_trait;
use sift_core::{KeyValueStore, MemoryStore, StoreError, StoreMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    sets: AtomicUsize,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_get.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_set.store(on, Ordering::SeqCst);
    }

    /// Number of `set` calls that reached the inner store.
    pub fn committed_writes(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreMap, StoreError> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("read rejected".to_string()));
        }
        self.inner.get(keys).await
    }

    async fn set(&self, items: StoreMap) -> Result<(), StoreError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("quota exceeded".to_string()));
        }
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(items).await
    }
}
