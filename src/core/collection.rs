use std::path::{Path, PathBuf};
use std::sync::Arc;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::CollectionStats;
use crate::core::types::{Record, Value};
use crate::memory::cache::RecordCache;
use crate::query::builder::Query;
use crate::query::operations::{DeleteAll, DeleteOne, GetAll, GetOne, UpdateAll, UpdateOne};
use crate::storage::file_lock::FileLock;
use crate::storage::json_file::JsonFileStore;
use crate::storage::layout::StorageLayout;
use crate::storage::persistence::Persistence;

// State shared with background flush tasks
struct Shared {
    name: String,
    cache: Mutex<RecordCache>,
    persistence: Persistence,
    flush_error: Mutex<Option<Error>>,
}

impl Shared {
    async fn flush(&self) -> Result<bool> {
        let flushed = self.persistence.flush(&self.cache).await?;
        *self.flush_error.lock() = None;
        Ok(flushed)
    }
}

/// Handle to one file-backed collection.
///
/// Opening loads the whole blob into the cache; every read is served from
/// the cache. Only one handle per name and location may be alive at a time.
///
/// `insert` returns before its flush completes; use [`Collection::flushed`]
/// to wait for durability. Query mutations (`update_*`, `delete_*`) flush
/// before their `run` returns. Separate callers mutating the same handle are
/// not coordinated beyond each single call.
///
/// Dropping the handle releases the name at once. A flush still in flight
/// completes in the background, so await `flushed` before dropping when the
/// next open must see every insert.
pub struct Collection {
    shared: Arc<Shared>,
    pending: Mutex<Vec<JoinHandle<()>>>,
    _lock: FileLock,
}

impl Collection {
    /// Open `name` under `location` with default settings, creating the
    /// directory and an empty blob when missing
    pub async fn open(name: &str, location: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_config(name, Config::at(location)).await
    }

    pub async fn open_with_config(name: &str, config: Config) -> Result<Self> {
        let config = config.normalized();
        let layout = StorageLayout::new(config.location.clone())?;
        let lock = FileLock::acquire(&layout.lock_path(name))?;
        let store = JsonFileStore::new(layout.collection_path(name));

        let created = store.create_if_missing().await.map_err(|e| {
            Error::new(
                ErrorKind::Database,
                format!("Failed to initialize database: {}", e),
            )
        })?;
        if created {
            info!(path = %store.path().display(), "Database file created");
        }

        Self::assemble(name, &config, store, lock).await
    }

    /// Open a collection whose blob must already exist. A missing blob
    /// surfaces as `NotFound`.
    pub async fn open_existing(name: &str, config: Config) -> Result<Self> {
        let config = config.normalized();
        let layout = StorageLayout::new(config.location.clone())?;
        let lock = FileLock::acquire(&layout.lock_path(name))?;
        let store = JsonFileStore::new(layout.collection_path(name));

        Self::assemble(name, &config, store, lock).await
    }

    async fn assemble(name: &str, config: &Config, store: JsonFileStore, lock: FileLock) -> Result<Self> {
        let shared = Arc::new(Shared {
            name: name.to_string(),
            cache: Mutex::new(RecordCache::new(config)),
            persistence: Persistence::new(name.to_string(), store),
            flush_error: Mutex::new(None),
        });

        shared.persistence.load(&shared.cache).await?;

        Ok(Collection {
            shared,
            pending: Mutex::new(Vec::new()),
            _lock: lock,
        })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn path(&self) -> &Path {
        self.shared.persistence.store().path()
    }

    /// Number of live records
    pub fn size(&self) -> usize {
        self.shared.cache.lock().len()
    }

    pub fn is_dirty(&self) -> bool {
        self.shared.cache.lock().is_dirty()
    }

    pub(crate) fn cache(&self) -> &Mutex<RecordCache> {
        &self.shared.cache
    }

    pub async fn insert(&self, record: Record) -> Result<Record> {
        let mut inserted = self.insert_many(vec![record]).await?;
        inserted.pop().ok_or_else(|| {
            Error::new(ErrorKind::Internal, "Insert returned no record".to_string())
        })
    }

    /// Admit `records` in order and schedule a flush. Identities are checked
    /// for every record before any is admitted.
    pub async fn insert_many(&self, records: Vec<Record>) -> Result<Vec<Record>> {
        {
            let mut cache = self.shared.cache.lock();
            for record in &records {
                cache.identity(record)?;
            }
            for record in &records {
                if let Some((evicted, _)) = cache.insert(record.clone())? {
                    debug!(collection = %self.shared.name, id = %evicted, "Record evicted on insert");
                }
            }
        }

        self.schedule_flush();
        Ok(records)
    }

    fn schedule_flush(&self) {
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            if let Err(e) = shared.flush().await {
                warn!(collection = %shared.name, error = %e, "Background flush failed");
                *shared.flush_error.lock() = Some(e);
            }
        });

        let mut pending = self.pending.lock();
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    /// Wait for every scheduled flush. Fails if a background flush failed and
    /// the collection is still dirty.
    pub async fn flushed(&self) -> Result<()> {
        let handles = std::mem::take(&mut *self.pending.lock());
        for handle in handles {
            handle.await?;
        }

        let failure = self.shared.flush_error.lock().take();
        match failure {
            Some(e) if self.is_dirty() => Err(e),
            _ => Ok(()),
        }
    }

    /// Write the cache now if it is dirty
    pub async fn flush(&self) -> Result<()> {
        self.shared.flush().await.map(|_| ())
    }

    /// Re-read the blob into the cache. A missing blob leaves an empty
    /// collection instead of failing.
    pub async fn reload(&self) -> Result<usize> {
        match self.shared.persistence.load(&self.shared.cache).await {
            Err(e) if e.is_not_found() => {
                warn!(collection = %self.shared.name, "Blob missing on reload, starting empty");
                self.shared.cache.lock().load(Vec::new())?;
                Ok(0)
            }
            other => other,
        }
    }

    /// First record (in cache order) whose indexed `field` holds `value`.
    /// Answers from the field index only: unindexed fields yield nothing.
    pub fn lookup(&self, field: &str, value: impl Into<Value>) -> Option<Record> {
        let cache = self.shared.cache.lock();
        let ids = cache.in_cache_order(cache.index().lookup(field, &value.into()));
        ids.first().and_then(|id| cache.get(id)).cloned()
    }

    pub fn lookup_all(&self, field: &str, value: impl Into<Value>) -> Vec<Record> {
        let cache = self.shared.cache.lock();
        cache
            .in_cache_order(cache.index().lookup(field, &value.into()))
            .iter()
            .filter_map(|id| cache.get(id).cloned())
            .collect()
    }

    pub fn get_one(&self, fields: &[&str]) -> Query<'_, GetOne> {
        Query::new(self, GetOne { fields: owned(fields) })
    }

    pub fn get_all(&self, fields: &[&str]) -> Query<'_, GetAll> {
        Query::new(self, GetAll { fields: owned(fields) })
    }

    pub fn update_one(&self, patch: Record) -> Query<'_, UpdateOne> {
        Query::new(self, UpdateOne { patch })
    }

    pub fn update_all(&self, patch: Record) -> Query<'_, UpdateAll> {
        Query::new(self, UpdateAll { patch })
    }

    pub fn delete_one(&self) -> Query<'_, DeleteOne> {
        Query::new(self, DeleteOne)
    }

    pub fn delete_all(&self) -> Query<'_, DeleteAll> {
        Query::new(self, DeleteAll)
    }

    pub fn stats(&self) -> CollectionStats {
        let pending_flushes = self.pending.lock().iter().filter(|h| !h.is_finished()).count();
        let cache = self.shared.cache.lock();

        CollectionStats {
            name: self.shared.name.clone(),
            size: cache.len(),
            capacity: cache.capacity(),
            policy: cache.policy().into(),
            evictions: cache.evictions(),
            resizes: cache.resizes(),
            index_entries: cache.index().entry_count(),
            dirty: cache.is_dirty(),
            pending_flushes,
            flush_count: self.shared.persistence.flush_count(),
            last_flush_time: self.shared.persistence.last_flush(),
        }
    }
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}
