//! Snapshot and license persistence on top of a key-value backend.

use common::EpochMillis;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{KeyValueStore, KeyValueStoreExt, Result, StoredValue};

/// Key holding the serialized customer list.
pub const KEY_CUSTOMERS: &str = "customers";

/// Key holding the serialized order list.
pub const KEY_ORDERS: &str = "orders";

/// Key holding the license expiry as raw epoch milliseconds.
pub const KEY_LICENSE_END: &str = "license_end";

/// Suffix of the keys that keep a copy of lists that failed to load.
pub const UNREADABLE_SUFFIX: &str = ".unreadable";

/// The full persisted repository state, saved and loaded as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<C, O> {
    pub customers: Vec<C>,
    pub orders: Vec<O>,
}

impl<C, O> Snapshot<C, O> {
    /// Creates a snapshot with no customers and no orders.
    pub fn empty() -> Self {
        Self {
            customers: Vec::new(),
            orders: Vec::new(),
        }
    }
}

impl<C, O> Default for Snapshot<C, O> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Persistence contract used by the repository and the license engine.
///
/// Reads are total: anything missing or malformed comes back as the empty
/// value. Only writes can fail.
#[derive(Debug, Clone)]
pub struct PersistenceStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PersistenceStore<S> {
    /// Wraps a key-value backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying backend.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Loads the snapshot.
    ///
    /// If either list is missing it reads as empty. If either list is
    /// unreadable or malformed the whole snapshot reads as empty, and the
    /// stored lists are copied under `<key>.unreadable` first so the next
    /// save does not destroy them.
    #[tracing::instrument(skip(self))]
    pub async fn load<C, O>(&self) -> Snapshot<C, O>
    where
        C: DeserializeOwned,
        O: DeserializeOwned,
    {
        let customers = self.load_list::<C>(KEY_CUSTOMERS).await;
        let orders = self.load_list::<O>(KEY_ORDERS).await;

        match (customers, orders) {
            (Some(customers), Some(orders)) => {
                tracing::debug!(
                    customers = customers.len(),
                    orders = orders.len(),
                    "snapshot loaded"
                );
                Snapshot { customers, orders }
            }
            _ => {
                tracing::warn!("stored snapshot is corrupt, starting from an empty snapshot");
                self.preserve_unreadable().await;
                Snapshot::empty()
            }
        }
    }

    /// Saves the snapshot. Both lists are written in one atomic batch.
    #[tracing::instrument(skip(self, snapshot), fields(customers = snapshot.customers.len(), orders = snapshot.orders.len()))]
    pub async fn save<C, O>(&self, snapshot: &Snapshot<C, O>) -> Result<()>
    where
        C: Serialize,
        O: Serialize,
    {
        let customers = serde_json::to_string(&snapshot.customers)?;
        let orders = serde_json::to_string(&snapshot.orders)?;

        self.store
            .put_all(vec![
                (KEY_CUSTOMERS.to_string(), StoredValue::Text(customers)),
                (KEY_ORDERS.to_string(), StoredValue::Text(orders)),
            ])
            .await
    }

    /// Loads the license expiry. Missing or non-integer data reads as zero.
    pub async fn load_license_end(&self) -> EpochMillis {
        match self.store.get_integer(KEY_LICENSE_END).await {
            Ok(Some(millis)) => EpochMillis::new(millis),
            Ok(None) => EpochMillis::ZERO,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read license expiry, treating as never activated");
                EpochMillis::ZERO
            }
        }
    }

    /// Persists the license expiry.
    pub async fn save_license_end(&self, end: EpochMillis) -> Result<()> {
        self.store
            .put(KEY_LICENSE_END, StoredValue::Integer(end.as_millis()))
            .await
    }

    /// Copies the raw list values aside. Best effort: failures are logged.
    async fn preserve_unreadable(&self) {
        let mut backups = Vec::new();
        for key in [KEY_CUSTOMERS, KEY_ORDERS] {
            match self.store.get(key).await {
                Ok(Some(value)) => {
                    tracing::warn!(key, raw = ?value, "keeping unreadable list");
                    backups.push((format!("{key}{UNREADABLE_SUFFIX}"), value));
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(key, error = %e, "could not read list for backup"),
            }
        }
        if backups.is_empty() {
            return;
        }
        if let Err(e) = self.store.put_all(backups).await {
            tracing::warn!(error = %e, "failed to back up unreadable lists");
        }
    }

    /// Returns Some(list) if the key is absent or decodes, None if corrupt.
    async fn load_list<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        let raw = match self.store.get(key).await {
            Ok(Some(StoredValue::Text(raw))) => raw,
            Ok(None) => return Some(Vec::new()),
            Ok(Some(StoredValue::Integer(_))) => {
                tracing::warn!(key, "expected a serialized list, found an integer");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read stored list");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => Some(list),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored list is malformed");
                None
            }
        }
    }
}
