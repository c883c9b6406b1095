use std::time::Duration;
use tokio::time::timeout;
use wellstore_core::{PreferenceStore, StorageLayout, WellData, WellStore, WellStoreError};

const WAIT: Duration = Duration::from_secs(5);

fn open_store(layout: StorageLayout) -> WellStore {
    let prefs = PreferenceStore::open_in_memory("well_data_store").unwrap();
    WellStore::new(prefs, layout)
}

fn named(id: i32, name: &str) -> WellData {
    WellData::new(Some(id)).with_field("name", name)
}

#[tokio::test]
async fn first_value_is_current_list_even_when_absent() {
    let store = open_store(StorageLayout::Mirrored);
    let mut watcher = store.observe_list();

    let first = timeout(WAIT, watcher.next()).await.unwrap().unwrap();
    assert!(first.is_empty());
}

#[tokio::test]
async fn save_list_is_observed_in_order() {
    let store = open_store(StorageLayout::Mirrored);
    store.upsert(Some(1), named(1, "stale")).await.unwrap();
    let mut watcher = store.observe_list();
    watcher.next().await.unwrap();

    let list = vec![named(3, "C"), named(1, "A"), named(2, "B")];
    store.save_list(list.clone()).await.unwrap();

    let observed = timeout(WAIT, watcher.next()).await.unwrap().unwrap();
    assert_eq!(observed, list);
}

#[tokio::test]
async fn every_mutation_wakes_subscriber() {
    let store = open_store(StorageLayout::Mirrored);
    let mut watcher = store.observe_list();
    assert!(watcher.next().await.unwrap().is_empty());

    store.upsert(Some(1), named(1, "A")).await.unwrap();
    assert_eq!(
        timeout(WAIT, watcher.next()).await.unwrap().unwrap(),
        vec![named(1, "A")]
    );

    store.delete_by_id(1).await.unwrap();
    assert!(timeout(WAIT, watcher.next()).await.unwrap().unwrap().is_empty());

    store.reset().await.unwrap();
    assert!(timeout(WAIT, watcher.next()).await.unwrap().unwrap().is_empty());
}

#[tokio::test]
async fn subscriber_waits_until_a_change_commits() {
    let store = open_store(StorageLayout::Mirrored);
    let mut watcher = store.observe_list();
    watcher.next().await.unwrap();

    let pending = timeout(Duration::from_millis(50), watcher.next()).await;
    assert!(pending.is_err(), "no commit happened, so no value is due");
}

#[tokio::test]
async fn waiting_subscriber_receives_concurrent_write() {
    let store = open_store(StorageLayout::Canonical);
    let mut watcher = store.observe_list();
    watcher.next().await.unwrap();

    let writer = store.clone();
    let waiter = tokio::spawn(async move { watcher.next().await });
    writer.upsert(Some(5), named(5, "E")).await.unwrap();

    let observed = timeout(WAIT, waiter).await.unwrap().unwrap().unwrap();
    assert_eq!(observed, vec![named(5, "E")]);
}

#[tokio::test]
async fn dropping_store_closes_subscription() {
    let store = open_store(StorageLayout::Mirrored);
    let mut watcher = store.observe_list();
    watcher.next().await.unwrap();
    drop(store);

    let err = timeout(WAIT, watcher.next()).await.unwrap().unwrap_err();
    assert!(matches!(err, WellStoreError::Closed));
}
