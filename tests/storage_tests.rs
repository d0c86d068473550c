//! Store tests: open/lock behavior, transaction scoping, lookups.

use std::time::{Duration, Instant};

use redb::ReadableTable;
use tempfile::TempDir;

use urlshort::errors::UrlshortError;
use urlshort::storage::{Mapping, MappingStore, URLS_TABLE, UrlStore};

fn open_store(dir: &TempDir) -> UrlStore {
    UrlStore::open(dir.path().join("url.db"), Duration::from_secs(1)).expect("Failed to open store")
}

#[test]
fn test_lookup_on_fresh_database_is_none() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    assert_eq!(store.lookup("/anything").unwrap(), None);
    assert_eq!(store.len().unwrap(), 0);
    assert!(store.mappings().unwrap().is_empty());
}

#[test]
fn test_upsert_and_lookup() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .upsert(&Mapping::new("/gh", "https://github.com"))
        .unwrap();

    assert_eq!(
        store.lookup("/gh").unwrap().as_deref(),
        Some("https://github.com")
    );
    assert_eq!(store.lookup("/other").unwrap(), None);
}

#[test]
fn test_upsert_last_write_wins() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store.upsert(&Mapping::new("/a", "https://one.example")).unwrap();
    store.upsert(&Mapping::new("/a", "https://two.example")).unwrap();

    assert_eq!(
        store.lookup("/a").unwrap().as_deref(),
        Some("https://two.example")
    );
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn test_mappings_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let store = open_store(&dir);
        store.upsert(&Mapping::new("/keep", "https://kept.example")).unwrap();
    }

    let store = open_store(&dir);
    assert_eq!(
        store.lookup("/keep").unwrap().as_deref(),
        Some("https://kept.example")
    );
}

#[test]
fn test_mappings_are_key_ordered() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store.upsert(&Mapping::new("/b", "https://b.example")).unwrap();
    store.upsert(&Mapping::new("/a", "https://a.example")).unwrap();

    let paths: Vec<String> = store.mappings().unwrap().into_iter().map(|m| m.path).collect();
    assert_eq!(paths, vec!["/a".to_string(), "/b".to_string()]);
}

#[test]
fn test_second_open_times_out_on_lock() {
    let dir = TempDir::new().unwrap();
    let _holder = open_store(&dir);

    let timeout = Duration::from_millis(200);
    let start = Instant::now();
    let err = UrlStore::open(dir.path().join("url.db"), timeout).unwrap_err();

    assert!(matches!(err, UrlshortError::DatabaseLocked(_)));
    assert!(start.elapsed() >= timeout);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_open_succeeds_after_holder_releases() {
    let dir = TempDir::new().unwrap();
    let holder = open_store(&dir);
    let path = dir.path().join("url.db");

    let waiter = std::thread::spawn(move || UrlStore::open(path, Duration::from_secs(5)));
    std::thread::sleep(Duration::from_millis(150));
    drop(holder);

    let store = waiter.join().unwrap().expect("open should succeed once the lock is free");
    assert_eq!(store.len().unwrap(), 0);
}

#[test]
fn test_open_garbage_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("url.db");
    std::fs::write(&path, vec![0xAB; 8192]).unwrap();

    let err = UrlStore::open(&path, Duration::from_millis(100)).unwrap_err();
    assert!(matches!(err, UrlshortError::DatabaseOpen(_)));
}

#[test]
fn test_write_inside_read_is_rejected_not_deadlocked() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let err = store
        .view(|_txn| store.upsert(&Mapping::new("/x", "https://x.example")))
        .unwrap_err();

    assert!(matches!(err, UrlshortError::NestedTransaction(_)));
    assert_eq!(store.lookup("/x").unwrap(), None);

    // the guard is released once the read closes
    store.upsert(&Mapping::new("/x", "https://x.example")).unwrap();
    assert!(store.lookup("/x").unwrap().is_some());
}

#[test]
fn test_failed_update_persists_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let result: urlshort::errors::Result<()> = store.update(|txn| {
        let mut table = txn.open_table(URLS_TABLE)?;
        table.insert("/partial".as_bytes(), "https://partial.example".as_bytes())?;
        Err(UrlshortError::validation("second item failed"))
    });

    assert!(result.is_err());
    assert_eq!(store.lookup("/partial").unwrap(), None);
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_reader_snapshot_ignores_later_commit() {
    let dir = TempDir::new().unwrap();
    let store = std::sync::Arc::new(open_store(&dir));
    store.upsert(&Mapping::new("/s", "https://before.example")).unwrap();

    let (opened_tx, opened_rx) = std::sync::mpsc::channel();
    let (written_tx, written_rx) = std::sync::mpsc::channel();

    let reader_store = store.clone();
    let reader = std::thread::spawn(move || {
        reader_store.view(|txn| {
            opened_tx.send(()).unwrap();
            written_rx.recv().unwrap();
            let table = txn.open_table(URLS_TABLE)?;
            let value = table
                .get("/s".as_bytes())?
                .map(|v| String::from_utf8_lossy(v.value()).into_owned());
            Ok(value)
        })
    });

    opened_rx.recv().unwrap();
    store.upsert(&Mapping::new("/s", "https://after.example")).unwrap();
    written_tx.send(()).unwrap();

    let seen = reader.join().unwrap().unwrap();
    assert_eq!(seen.as_deref(), Some("https://before.example"));
    assert_eq!(
        store.lookup("/s").unwrap().as_deref(),
        Some("https://after.example")
    );
}
