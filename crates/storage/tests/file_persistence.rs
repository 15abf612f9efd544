//! Integration tests for snapshot persistence on the file backend.

use common::EpochMillis;
use serde::{Deserialize, Serialize};
use storage::{FileKeyValueStore, KEY_ORDERS, PersistenceStore, Snapshot, StoredValue};
use storage::KeyValueStoreExt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    code: String,
    customer_name: String,
    price: i64,
}

fn row(code: &str, price: i64) -> Row {
    Row {
        code: code.to_string(),
        customer_name: "Siti".to_string(),
        price,
    }
}

#[tokio::test]
async fn snapshot_and_license_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("laundry_commercial.json");

    let store = PersistenceStore::new(FileKeyValueStore::new(&path));
    let snapshot = Snapshot {
        customers: vec![row("C1", 0)],
        orders: vec![row("LND-2", 30000), row("LND-1", 25000)],
    };
    store.save(&snapshot).await.unwrap();
    store
        .save_license_end(EpochMillis::new(1_800_000_000_000))
        .await
        .unwrap();

    let reopened = PersistenceStore::new(FileKeyValueStore::new(&path));
    let loaded: Snapshot<Row, Row> = reopened.load().await;
    assert_eq!(loaded, snapshot);
    assert_eq!(
        reopened.load_license_end().await,
        EpochMillis::new(1_800_000_000_000)
    );
}

#[tokio::test]
async fn save_of_loaded_snapshot_is_a_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    let store = PersistenceStore::new(FileKeyValueStore::new(dir.path().join("kv.json")));

    store
        .save(&Snapshot {
            customers: vec![row("C1", 0)],
            orders: vec![row("LND-9", 1)],
        })
        .await
        .unwrap();

    let first: Snapshot<Row, Row> = store.load().await;
    store.save(&first).await.unwrap();
    let second: Snapshot<Row, Row> = store.load().await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn orders_key_is_a_json_text_blob() {
    let dir = tempfile::tempdir().unwrap();
    let kv = FileKeyValueStore::new(dir.path().join("kv.json"));
    let store = PersistenceStore::new(kv.clone());

    store
        .save(&Snapshot::<Row, Row> {
            customers: vec![],
            orders: vec![row("LND-1", 25000)],
        })
        .await
        .unwrap();

    let raw = kv.get_text(KEY_ORDERS).await.unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value[0]["customerName"], "Siti");
    assert_eq!(value[0]["price"], 25000);
}

#[tokio::test]
async fn corrupt_document_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kv.json");
    std::fs::write(&path, "garbage").unwrap();

    let store = PersistenceStore::new(FileKeyValueStore::new(&path));
    let loaded: Snapshot<Row, Row> = store.load().await;
    assert_eq!(loaded, Snapshot::empty());

    // A later write replaces the corrupt document
    store
        .backend()
        .put(KEY_ORDERS, StoredValue::from("[]"))
        .await
        .unwrap();
    let loaded: Snapshot<Row, Row> = store.load().await;
    assert!(loaded.orders.is_empty());
}
