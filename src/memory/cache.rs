use std::collections::{BTreeMap, HashMap};
use lru::LruCache;
use tracing::debug;
use crate::core::config::{Config, ResizePolicy};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{identity_of, Record, RecordId};
use crate::index::field_index::FieldIndex;
use crate::memory::adaptive::CapacityManager;

#[derive(Debug)]
struct Slot {
    seq: u64,
    record: Record,
}

/// In-memory mirror of one collection.
///
/// Records are keyed by identity and iterate in first-insertion order. A
/// separate recency queue drives LRU eviction, and the field index is kept
/// in step with every admission, replacement, removal and eviction.
///
/// Dirty tracking is a generation counter: each mutation bumps `generation`,
/// a completed flush records the generation it wrote.
pub struct RecordCache {
    id_field: String,
    records: HashMap<RecordId, Slot>,
    order: BTreeMap<u64, RecordId>,
    recency: LruCache<RecordId, ()>,
    index: FieldIndex,
    capacity: CapacityManager,
    next_seq: u64,
    generation: u64,
    flushed_generation: u64,
    evictions: u64,
}

impl RecordCache {
    pub fn new(config: &Config) -> Self {
        RecordCache {
            id_field: config.id_field.clone(),
            records: HashMap::new(),
            order: BTreeMap::new(),
            recency: LruCache::unbounded(),
            index: FieldIndex::new(config.indexed_fields.clone()),
            capacity: CapacityManager::new(config.max_cache_size, config.resize),
            next_seq: 0,
            generation: 0,
            flushed_generation: 0,
            evictions: 0,
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn identity(&self, record: &Record) -> Result<RecordId> {
        identity_of(record, &self.id_field).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Record has no usable {:?} field", self.id_field),
            )
        })
    }

    /// Replace the whole cache with `records` as read from storage. No
    /// eviction runs, so a large load may sit above capacity until the next
    /// admission. Leaves the cache clean.
    ///
    /// Every record is checked before the cache is touched: on `Corrupt` the
    /// previous contents and dirty state survive.
    pub fn load(&mut self, records: Vec<Record>) -> Result<()> {
        let keyed = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| match identity_of(&record, &self.id_field) {
                Some(id) => Ok((id, record)),
                None => Err(Error::new(
                    ErrorKind::Corrupt,
                    format!("Stored record {} without {:?} field", i, self.id_field),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        self.clear();
        for (id, record) in keyed {
            self.put(id, record);
        }

        self.flushed_generation = self.generation;
        Ok(())
    }

    /// Add or overwrite by identity. A new identity arriving at capacity under
    /// the fixed policy evicts the least recently used record first, which is
    /// returned.
    pub fn insert(&mut self, record: Record) -> Result<Option<(RecordId, Record)>> {
        let id = self.identity(&record)?;
        let mut evicted = None;

        if !self.records.contains_key(&id) && self.capacity.must_evict(self.records.len()) {
            evicted = self.evict_lru();
        }

        self.put(id, record);
        self.capacity.adapt(self.records.len());
        self.generation += 1;
        Ok(evicted)
    }

    /// Swap the contents of an existing record, keeping its position
    pub fn replace(&mut self, id: &RecordId, record: Record) -> Option<Record> {
        let slot = self.records.get_mut(id)?;
        let previous = std::mem::replace(&mut slot.record, record);

        self.index.deindex(id, &previous);
        self.index.index(id, &slot.record);
        self.recency.promote(id);
        self.generation += 1;
        Some(previous)
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<Record> {
        let slot = self.records.remove(id)?;
        self.order.remove(&slot.seq);
        self.recency.pop(id);
        self.index.deindex(id, &slot.record);
        self.generation += 1;
        Some(slot.record)
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.get(id).map(|slot| &slot.record)
    }

    /// Mark `id` as most recently used
    pub fn touch(&mut self, id: &RecordId) {
        self.recency.promote(id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RecordId, &Record)> {
        self.order
            .values()
            .filter_map(|id| self.records.get(id).map(|slot| (id, &slot.record)))
    }

    /// Sort identities into cache iteration order, dropping unknown ones
    pub fn in_cache_order(&self, ids: Vec<RecordId>) -> Vec<RecordId> {
        let mut known: Vec<(u64, RecordId)> = ids
            .into_iter()
            .filter_map(|id| self.records.get(&id).map(|slot| (slot.seq, id)))
            .collect();
        known.sort_by_key(|(seq, _)| *seq);
        known.into_iter().map(|(_, id)| id).collect()
    }

    /// Least recently used identity, next in line for eviction
    #[cfg(test)]
    pub(crate) fn lru_candidate(&self) -> Option<&RecordId> {
        self.recency.peek_lru().map(|(id, _)| id)
    }

    pub fn index(&self) -> &FieldIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.max_size()
    }

    pub fn policy(&self) -> ResizePolicy {
        self.capacity.policy()
    }

    pub fn resizes(&self) -> u64 {
        self.capacity.resizes()
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_dirty(&self) -> bool {
        self.generation != self.flushed_generation
    }

    /// Record that the state as of `generation` is durable
    pub fn mark_flushed(&mut self, generation: u64) {
        self.flushed_generation = self.flushed_generation.max(generation);
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
        self.recency.clear();
        self.index.clear();
        self.generation += 1;
    }

    fn put(&mut self, id: RecordId, record: Record) {
        if let Some(slot) = self.records.get_mut(&id) {
            let previous = std::mem::replace(&mut slot.record, record);
            self.index.deindex(&id, &previous);
            self.index.index(&id, &slot.record);
            self.recency.promote(&id);
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.index(&id, &record);
        self.order.insert(seq, id.clone());
        self.recency.put(id.clone(), ());
        self.records.insert(id, Slot { seq, record });
    }

    fn evict_lru(&mut self) -> Option<(RecordId, Record)> {
        let (id, _) = self.recency.pop_lru()?;
        let slot = self.records.remove(&id)?;
        self.order.remove(&slot.seq);
        self.index.deindex(&id, &slot.record);
        self.evictions += 1;
        debug!(id = %id, "Evicted least recently used record");
        Some((id, slot.record))
    }
}
