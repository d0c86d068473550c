//! redb-backed mapping store
//!
//! Transactions are closure scoped: a read transaction never outlives the
//! `view` call that opened it, so nothing can fall through to another
//! handler while it is still open. Writers take the engine's exclusive
//! write lock, which must never be requested from inside a read on the
//! same thread.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use redb::{
    Database, DatabaseError, ReadTransaction, ReadableTable, ReadableTableMetadata,
    TableDefinition, TableError, WriteTransaction,
};
use tracing::{debug, info, warn};

use super::Mapping;
use crate::errors::{Result, UrlshortError};

/// The single collection: path bytes -> URL bytes.
pub const URLS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("urls");

/// 文件锁被占用时的重试间隔
const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

thread_local! {
    static OPEN_READS: Cell<usize> = const { Cell::new(0) };
    static OPEN_WRITES: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as inside a transaction for as long as it lives.
struct TxnScope(&'static std::thread::LocalKey<Cell<usize>>);

impl TxnScope {
    fn enter(counter: &'static std::thread::LocalKey<Cell<usize>>) -> Self {
        counter.with(|c| c.set(c.get() + 1));
        TxnScope(counter)
    }
}

impl Drop for TxnScope {
    fn drop(&mut self) {
        self.0.with(|c| c.set(c.get().saturating_sub(1)));
    }
}

fn depth(counter: &'static std::thread::LocalKey<Cell<usize>>) -> usize {
    counter.with(|c| c.get())
}

/// What the HTTP layer needs from the store.
///
/// Each call is its own transaction and returns owned data.
pub trait MappingStore: Send + Sync {
    fn lookup(&self, path: &str) -> Result<Option<String>>;
    fn upsert(&self, mapping: &Mapping) -> Result<()>;
}

/// Process-wide handle to the database file.
///
/// redb allows one open handle per file; share it behind an `Arc`. The file
/// lock is released when the last reference drops.
pub struct UrlStore {
    db: Database,
    path: PathBuf,
}

impl std::fmt::Debug for UrlStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl UrlStore {
    /// Open or create the database file, waiting at most `timeout` for
    /// another holder to release its lock.
    pub fn open<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let deadline = Instant::now() + timeout;

        loop {
            match Database::create(path) {
                Ok(db) => {
                    info!("Opened database at {}", path.display());
                    return Ok(Self {
                        db,
                        path: path.to_path_buf(),
                    });
                }
                Err(DatabaseError::DatabaseAlreadyOpen) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(UrlshortError::database_locked(format!(
                            "{} is held by another handle (waited {:?})",
                            path.display(),
                            timeout
                        )));
                    }
                    debug!("Database {} is locked, retrying", path.display());
                    std::thread::sleep(LOCK_RETRY_INTERVAL.min(deadline - now));
                }
                Err(e) => {
                    return Err(UrlshortError::database_open(format!(
                        "Failed to open {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` inside a read transaction.
    ///
    /// The transaction is closed before this returns; `f` must hand back
    /// owned values only.
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTransaction) -> Result<T>,
    {
        let _scope = TxnScope::enter(&OPEN_READS);
        let txn = self.db.begin_read()?;
        f(&txn)
    }

    /// Run `f` inside a write transaction. `Ok` commits, `Err` aborts and
    /// nothing `f` wrote persists.
    ///
    /// Fails with `NestedTransaction` if this thread already holds a read or
    /// write transaction, since waiting on the write lock there can hang
    /// forever.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&WriteTransaction) -> Result<T>,
    {
        if depth(&OPEN_READS) > 0 {
            return Err(UrlshortError::nested_transaction(
                "write transaction requested while a read transaction is open on this thread",
            ));
        }
        if depth(&OPEN_WRITES) > 0 {
            return Err(UrlshortError::nested_transaction(
                "write transaction requested inside another write transaction",
            ));
        }

        let _scope = TxnScope::enter(&OPEN_WRITES);
        let txn = self.db.begin_write()?;
        match f(&txn) {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    warn!("Failed to abort write transaction: {}", abort_err);
                }
                Err(e)
            }
        }
    }

    /// Every mapping in key order.
    pub fn mappings(&self) -> Result<Vec<Mapping>> {
        self.view(|txn| {
            let table = match txn.open_table(URLS_TABLE) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            };

            let mut out = Vec::new();
            for entry in table.iter()? {
                let (path, url) = entry?;
                out.push(Mapping::new(
                    String::from_utf8_lossy(path.value()),
                    String::from_utf8_lossy(url.value()),
                ));
            }
            Ok(out)
        })
    }

    /// Number of stored mappings; zero when the collection does not exist yet.
    pub fn len(&self) -> Result<u64> {
        self.view(|txn| match txn.open_table(URLS_TABLE) {
            Ok(table) => Ok(table.len()?),
            Err(TableError::TableDoesNotExist(_)) => Ok(0),
            Err(e) => Err(e.into()),
        })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl MappingStore for UrlStore {
    /// A missing collection is the "no data yet" case, not an error.
    fn lookup(&self, path: &str) -> Result<Option<String>> {
        self.view(|txn| {
            let table = match txn.open_table(URLS_TABLE) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            let url = table
                .get(path.as_bytes())?
                .map(|v| String::from_utf8_lossy(v.value()).into_owned());
            Ok(url)
        })
    }

    fn upsert(&self, mapping: &Mapping) -> Result<()> {
        self.update(|txn| {
            let mut table = txn.open_table(URLS_TABLE)?;
            table.insert(mapping.path.as_bytes(), mapping.url.as_bytes())?;
            Ok(())
        })?;
        debug!("Stored mapping {} -> {}", mapping.path, mapping.url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, UrlStore) {
        let dir = TempDir::new().unwrap();
        let store = UrlStore::open(dir.path().join("url.db"), Duration::from_secs(1)).unwrap();
        (dir, store)
    }

    #[test]
    fn test_scope_counter_resets_after_view() {
        let (_dir, store) = open_temp();
        store.view(|_| Ok(())).unwrap();
        assert_eq!(depth(&OPEN_READS), 0);
    }

    #[test]
    fn test_scope_counter_resets_after_failed_view() {
        let (_dir, store) = open_temp();
        let result: Result<()> = store.view(|_| Err(UrlshortError::validation("boom")));
        assert!(result.is_err());
        assert_eq!(depth(&OPEN_READS), 0);
        store.upsert(&Mapping::new("/a", "https://a.example")).unwrap();
    }

    #[test]
    fn test_nested_write_inside_write_is_rejected() {
        let (_dir, store) = open_temp();
        let err = store
            .update(|_| store.upsert(&Mapping::new("/a", "https://a.example")))
            .unwrap_err();
        assert!(matches!(err, UrlshortError::NestedTransaction(_)));
        assert_eq!(depth(&OPEN_WRITES), 0);
    }
}
