//! Local persistence for the laundry order tracker.
//!
//! Storage is a small durable key-value area in the spirit of a preference
//! store. [`PersistenceStore`] layers the snapshot and license contracts on
//! top of any [`KeyValueStore`] backend.

pub mod error;
pub mod file;
pub mod kv;
pub mod memory;
pub mod snapshot;

pub use error::{Result, StorageError};
pub use file::FileKeyValueStore;
pub use kv::{KeyValueStore, KeyValueStoreExt, StoredValue};
pub use memory::InMemoryKeyValueStore;
pub use snapshot::{
    KEY_CUSTOMERS, KEY_LICENSE_END, KEY_ORDERS, PersistenceStore, Snapshot, UNREADABLE_SUFFIX,
};
