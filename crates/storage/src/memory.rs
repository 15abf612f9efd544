use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{KeyValueStore, Result, StoredValue};

/// In-memory key-value store for testing.
///
/// Clones share the same underlying map, so a test can keep a handle
/// while a repository owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyValueStore {
    entries: Arc<RwLock<HashMap<String, StoredValue>>>,
}

impl InMemoryKeyValueStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of keys stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if nothing has been written.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Clears all entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<()> {
        // One write guard for the whole batch
        let mut map = self.entries.write().await;
        map.extend(entries);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
