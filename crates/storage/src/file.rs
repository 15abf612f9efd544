//! JSON-file key-value backend.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{KeyValueStore, Result, StoredValue};

type Entries = BTreeMap<String, StoredValue>;

/// Key-value store persisted as a single JSON document.
///
/// Every write rewrites the document into a sibling temporary file and
/// renames it over the original, so readers see either the old or the new
/// document, never a torn one. A missing or unreadable document reads as
/// empty.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileKeyValueStore {
    /// Creates a store backed by the document at `path`.
    ///
    /// The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_entries(&self) -> Result<Entries> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "key-value document is corrupt, treating as empty"
                );
                Ok(Entries::new())
            }
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<StoredValue>> {
        Ok(self.read_entries().await?.remove(key))
    }

    #[tracing::instrument(skip(self, entries), fields(path = %self.path.display(), count = entries.len()))]
    async fn put_all(&self, entries: Vec<(String, StoredValue)>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut current = self.read_entries().await?;
        current.extend(entries);
        self.write_entries(&current).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut current = self.read_entries().await?;
        if current.remove(key).is_some() {
            self.write_entries(&current).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyValueStoreExt;

    #[test]
    fn temp_path_is_sibling() {
        let store = FileKeyValueStore::new("/data/laundry.json");
        assert_eq!(store.temp_path(), PathBuf::from("/data/laundry.json.tmp"));
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("absent.json"));
        assert!(store.get("orders").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = FileKeyValueStore::new(&path);
        store
            .put_all(vec![
                ("orders".to_string(), StoredValue::from("[]")),
                ("license_end".to_string(), StoredValue::Integer(123)),
            ])
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(&path);
        assert_eq!(reopened.get_integer("license_end").await.unwrap(), Some(123));
        assert_eq!(
            reopened.get_text("orders").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_reads_empty_and_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store = FileKeyValueStore::new(&path);
        assert!(store.get("customers").await.unwrap().is_none());

        store.put("customers", StoredValue::from("[]")).await.unwrap();
        assert_eq!(
            store.get_text("customers").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn remove_deletes_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("prefs.json"));
        store.put("a", StoredValue::Integer(1)).await.unwrap();
        store.remove("a").await.unwrap();
        assert!(store.get("a").await.unwrap().is_none());
    }
}
