use std::collections::{BTreeSet, HashMap};
use crate::core::config::IndexedFields;
use crate::core::types::{number_key, Record, RecordId, Value};

/// Per-field secondary index over top-level record fields.
///
/// Each scalar value maps to the set of identities currently holding it.
/// The index is advisory: the cache is always able to answer by full scan,
/// and the index is only consulted when it can be proven complete for a field.
#[derive(Debug)]
pub struct FieldIndex {
    fields: IndexedFields,
    entries: HashMap<String, HashMap<String, BTreeSet<RecordId>>>,
    // records carrying the field, whatever its value
    coverage: HashMap<String, usize>,
}

/// Serialized form of a scalar used as index key. Numbers are keyed by value
/// so `1` and `1.0` land together; arrays and objects are not indexed.
pub fn index_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_string()),
        Value::Bool(b) => Some(format!("b:{}", b)),
        Value::Number(n) => number_key(n).map(|key| format!("n:{}", key)),
        Value::String(s) => Some(format!("s:{}", s)),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl FieldIndex {
    pub fn new(fields: IndexedFields) -> Self {
        FieldIndex {
            fields,
            entries: HashMap::new(),
            coverage: HashMap::new(),
        }
    }

    pub fn is_indexed(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn index(&mut self, id: &RecordId, record: &Record) {
        for (field, value) in record {
            if !self.fields.contains(field) {
                continue;
            }
            *self.coverage.entry(field.clone()).or_insert(0) += 1;

            if let Some(key) = index_key(value) {
                self.entries
                    .entry(field.clone())
                    .or_default()
                    .entry(key)
                    .or_default()
                    .insert(id.clone());
            }
        }
    }

    /// Drop the mappings `record` produced. Must be given the same record
    /// contents that were indexed.
    pub fn deindex(&mut self, id: &RecordId, record: &Record) {
        for (field, value) in record {
            if !self.fields.contains(field) {
                continue;
            }
            if let Some(count) = self.coverage.get_mut(field) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    self.coverage.remove(field);
                }
            }

            let Some(key) = index_key(value) else { continue };
            if let Some(values) = self.entries.get_mut(field) {
                if let Some(ids) = values.get_mut(&key) {
                    ids.remove(id);
                    if ids.is_empty() {
                        values.remove(&key);
                    }
                }
                if values.is_empty() {
                    self.entries.remove(field);
                }
            }
        }
    }

    /// Identities whose `field` holds `value`
    pub fn lookup(&self, field: &str, value: &Value) -> Vec<RecordId> {
        index_key(value)
            .and_then(|key| self.entries.get(field)?.get(&key))
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// True when every one of `total` records carries `field`, so a lookup
    /// miss means no record matches.
    pub fn covers(&self, field: &str, total: usize) -> bool {
        self.is_indexed(field) && self.coverage.get(field).copied().unwrap_or(0) == total
    }

    pub fn entry_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|values| values.values())
            .map(BTreeSet::len)
            .sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.coverage.clear();
    }
}
