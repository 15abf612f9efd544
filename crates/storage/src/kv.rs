use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A value held in the key-value area.
///
/// Mirrors what a preference store can hold: text blobs and integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Integer(i64),
    Text(String),
}

impl StoredValue {
    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StoredValue::Text(s) => Some(s),
            StoredValue::Integer(_) => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoredValue::Integer(n) => Some(*n),
            StoredValue::Text(_) => None,
        }
    }
}

impl From<String> for StoredValue {
    fn from(s: String) -> Self {
        StoredValue::Text(s)
    }
}

impl From<&str> for StoredValue {
    fn from(s: &str) -> Self {
        StoredValue::Text(s.to_string())
    }
}

impl From<i64> for StoredValue {
    fn from(n: i64) -> Self {
        StoredValue::Integer(n)
    }
}

/// Core trait for key-value backends.
///
/// Implementations must be thread-safe (Send + Sync) and cheap to clone
/// handles onto the same underlying storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a single key. Returns None if the key was never written.
    async fn get(&self, key: &str) -> Result<Option<StoredValue>>;

    /// Writes all entries atomically - either every entry becomes visible
    /// to subsequent reads or none does.
    async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Extension trait providing typed reads on top of [`KeyValueStore`].
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Writes a single entry.
    async fn put(&self, key: &str, value: StoredValue) -> Result<()> {
        self.put_all(vec![(key.to_string(), value)]).await
    }

    /// Reads a text value. Non-text values read as None.
    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_text().map(str::to_string)))
    }

    /// Reads an integer value. Non-integer values read as None.
    async fn get_integer(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.get(key).await?.and_then(|v| v.as_integer()))
    }
}

// Blanket implementation for all KeyValueStore implementations
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}
