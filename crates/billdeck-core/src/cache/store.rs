// ── Local key-value storage for the offline cache ──

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::CoreError;

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cache");

/// Byte-oriented key-value store backing [`OfflineCache`](super::OfflineCache).
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError>;

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CoreError>;

    /// Returns `true` if the key existed.
    fn delete(&self, key: &str) -> Result<bool, CoreError>;

    /// All entries whose key starts with `prefix`, in key order.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, CoreError>;

    /// Remove every entry. Returns the number removed.
    fn clear(&self) -> Result<usize, CoreError> {
        let entries = self.scan("")?;
        let mut removed = 0;
        for (key, _) in entries {
            if self.delete(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// [`CacheStore`] backed by a single-file redb database.
pub struct RedbCache {
    db: Arc<Database>,
}

impl RedbCache {
    /// Open or create the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::cache(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        Self::create(path).map_err(CoreError::from)
    }

    fn create(path: &Path) -> Result<Self, redb::Error> {
        let db = Database::create(path)?;

        // Make sure the table exists so read transactions never miss it.
        let txn = db.begin_write()?;
        txn.open_table(TABLE)?;
        txn.commit()?;

        Ok(Self { db: Arc::new(db) })
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TABLE)?;
        Ok(table.get(key)?.map(|v| v.value().to_vec()))
    }

    fn write(&self, key: &str, value: &[u8]) -> Result<(), redb::Error> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool, redb::Error> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(TABLE)?;
            table.remove(key)?.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }

    fn range(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, redb::Error> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TABLE)?;

        let mut out = Vec::new();
        for entry in table.range(prefix..)? {
            let (key, value) = entry?;
            let key = key.value();
            if !key.starts_with(prefix) {
                break;
            }
            out.push((key.to_owned(), value.value().to_vec()));
        }
        Ok(out)
    }

    fn drain(&self) -> Result<usize, redb::Error> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(TABLE)?;
            let mut keys = Vec::new();
            for entry in table.iter()? {
                keys.push(entry?.0.value().to_owned());
            }
            for key in &keys {
                table.remove(key.as_str())?;
            }
            keys.len()
        };
        txn.commit()?;
        Ok(removed)
    }
}

impl CacheStore for RedbCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(self.read(key)?)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CoreError> {
        Ok(self.write(key, value)?)
    }

    fn delete(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.remove(key)?)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, CoreError> {
        Ok(self.range(prefix)?)
    }

    fn clear(&self) -> Result<usize, CoreError> {
        Ok(self.drain()?)
    }
}

/// Process-local [`CacheStore`], used when no cache file is configured.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A panic mid-insert leaves the map itself intact.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CoreError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CoreError> {
        self.entries().insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CoreError> {
        Ok(self.entries().remove(key).is_some())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, CoreError> {
        Ok(self
            .entries()
            .range(prefix.to_owned()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn clear(&self) -> Result<usize, CoreError> {
        let mut entries = self.entries();
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}
