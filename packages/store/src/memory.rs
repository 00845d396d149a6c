//! In-process record store.
//!
//! Behaves like the remote document: whole-collection reads and writes,
//! last writer wins. Used by the `--offline` mode of the binaries and as
//! the backing store in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use emergency_map_emergency_models::Emergency;
use tokio::sync::Mutex;

use crate::{Collection, EmergencyStore, StoreError};

/// Shared, cloneable in-memory collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collection: Arc<Mutex<Collection>>,
    fetches: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `records`.
    #[must_use]
    pub fn with_records(records: Vec<Emergency>) -> Self {
        Self::with_collection(records.into())
    }

    /// Creates a store holding `collection` as is.
    #[must_use]
    pub fn with_collection(collection: Collection) -> Self {
        Self {
            collection: Arc::new(Mutex::new(collection)),
            ..Self::default()
        }
    }

    /// Returns the decoded records currently stored.
    pub async fn snapshot(&self) -> Vec<Emergency> {
        self.collection.lock().await.to_records()
    }

    /// Returns a copy of the stored collection, undecodable entries
    /// included.
    pub async fn collection(&self) -> Collection {
        self.collection.lock().await.clone()
    }

    /// Number of `fetch_all` calls served.
    #[must_use]
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Number of `replace_all` calls served.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmergencyStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Collection, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.collection.lock().await.clone())
    }

    async fn replace_all(&self, collection: &Collection) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        *self.collection.lock().await = collection.clone();
        Ok(())
    }
}
