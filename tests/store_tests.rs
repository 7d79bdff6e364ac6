use tempfile::TempDir;

use coinsweeper::store::SweepStore;
use coinsweeper::threshold::DurationThreshold;
use coinsweeper::types::{WatchEntry, WatchList};

fn sample_list() -> WatchList {
    let mut entry = WatchEntry::new(
        "1WatchedAddress".to_string(),
        "private-key".to_string(),
        50_000_000,
        DurationThreshold::new(0, 0, 1, 0, 0).unwrap(),
    );
    entry
        .add_destination("1Savings".to_string(), "75%".to_string())
        .unwrap();
    entry
        .add_destination("1Change".to_string(), "0".to_string())
        .unwrap();

    let mut list = WatchList::default();
    list.upsert(entry);
    list
}

#[tokio::test]
async fn test_save_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("coinsweep.dat");
    let store = SweepStore::new(path, "hunter2");

    store.save(&sample_list()).await.unwrap();
    let loaded = store.load().await.unwrap();

    assert_eq!(loaded.entries().len(), 1);
    let entry = &loaded.entries()[0];
    assert_eq!(entry.address, "1WatchedAddress");
    assert_eq!(entry.private_key, "private-key");
    assert_eq!(entry.balance_threshold, 50_000_000);
    assert_eq!(entry.destinations().len(), 2);
    assert_eq!(entry.destinations()[0].address, "1Savings");
    assert_eq!(entry.destinations()[0].amount, "75%");
    assert_eq!(entry.destinations()[1].amount, "0");
}

#[tokio::test]
async fn test_missing_file_loads_empty_list() {
    let temp_dir = TempDir::new().unwrap();
    let store = SweepStore::new(temp_dir.path().join("absent.dat"), "hunter2");

    let loaded = store.load().await.unwrap();
    assert!(loaded.is_empty());
}

#[tokio::test]
async fn test_wrong_passphrase_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("coinsweep.dat");

    SweepStore::new(path.clone(), "hunter2")
        .save(&sample_list())
        .await
        .unwrap();

    let err = SweepStore::new(path, "wrong")
        .load()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("wrong passphrase"));
}

#[tokio::test]
async fn test_file_is_not_plaintext() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("coinsweep.dat");
    let store = SweepStore::new(path.clone(), "hunter2");

    store.save(&sample_list()).await.unwrap();

    // The data file holds private keys; nothing recognizable may survive
    // in the on-disk bytes.
    let raw = tokio::fs::read(&path).await.unwrap();
    let haystack = String::from_utf8_lossy(&raw);
    assert!(!haystack.contains("private-key"));
    assert!(!haystack.contains("1WatchedAddress"));
}

#[tokio::test]
async fn test_save_replaces_previous_contents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("coinsweep.dat");
    let store = SweepStore::new(path, "hunter2");

    store.save(&sample_list()).await.unwrap();

    let mut list = store.load().await.unwrap();
    list.upsert(WatchEntry::new(
        "1Second".to_string(),
        "other-key".to_string(),
        0,
        DurationThreshold::default(),
    ));
    store.save(&list).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded.entries().len(), 2);
}
