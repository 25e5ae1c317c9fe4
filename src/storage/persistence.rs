use std::sync::atomic::{AtomicU64, Ordering};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info};
use crate::core::error::{Error, Result};
use crate::memory::cache::RecordCache;
use crate::storage::json_file::{encode_records, JsonFileStore};

/// Moves a collection between its blob and its cache.
///
/// Flushes are serialized through `gate`: the snapshot and the write of one
/// flush complete before the next flush takes its snapshot, so an older
/// snapshot can never land on top of a newer one.
pub struct Persistence {
    name: String,
    store: JsonFileStore,
    gate: tokio::sync::Mutex<()>,
    flush_count: AtomicU64,
    last_flush: Mutex<Option<DateTime<Utc>>>,
}

impl Persistence {
    pub fn new(name: String, store: JsonFileStore) -> Self {
        Persistence {
            name,
            store,
            gate: tokio::sync::Mutex::new(()),
            flush_count: AtomicU64::new(0),
            last_flush: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &JsonFileStore {
        &self.store
    }

    /// Replace the cache contents with the blob. Fails with `NotFound` or
    /// `Corrupt`; the cache is untouched on failure.
    pub async fn load(&self, cache: &Mutex<RecordCache>) -> Result<usize> {
        let _gate = self.gate.lock().await;
        let records = self.store.read().await?;
        let count = records.len();

        cache.lock().load(records)?;
        info!(collection = %self.name, records = count, "Loaded collection");
        Ok(count)
    }

    /// Write the full cache if it is dirty. Returns whether a write happened.
    ///
    /// On failure the cache stays dirty so a later flush retries the same
    /// pending state.
    pub async fn flush(&self, cache: &Mutex<RecordCache>) -> Result<bool> {
        let _gate = self.gate.lock().await;

        let (bytes, generation, count) = {
            let cache = cache.lock();
            if !cache.is_dirty() {
                return Ok(false);
            }
            let records: Vec<_> = cache.iter().map(|(_, record)| record).collect();
            (encode_records(&records)?, cache.generation(), records.len())
        };

        self.store
            .write(bytes)
            .await
            .map_err(|e| Error::durability(&e, &self.name))?;

        cache.lock().mark_flushed(generation);
        self.flush_count.fetch_add(1, Ordering::Relaxed);
        *self.last_flush.lock() = Some(Utc::now());
        debug!(collection = %self.name, records = count, generation, "Flushed collection");
        Ok(true)
    }

    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    pub fn last_flush(&self) -> Option<DateTime<Utc>> {
        *self.last_flush.lock()
    }
}
