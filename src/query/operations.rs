use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{identity_of, Record, RecordId};
use crate::memory::cache::RecordCache;
use crate::query::matcher::Matcher;
use crate::query::projection::project;
use crate::query::scan::select;

/// What a query does with its selection once `run` is called
pub trait Operation {
    type Output;

    /// Whether a successful run must be followed by a flush
    const MUTATES: bool;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output>;
}

pub struct GetOne {
    pub fields: Vec<String>,
}

pub struct GetAll {
    pub fields: Vec<String>,
}

pub struct UpdateOne {
    pub patch: Record,
}

pub struct UpdateAll {
    pub patch: Record,
}

pub struct DeleteOne;

pub struct DeleteAll;

fn shape(fields: &[String], record: &Record) -> Result<Record> {
    if fields.is_empty() {
        Ok(record.clone())
    } else {
        project(fields, record)
    }
}

fn read(cache: &mut RecordCache, id: &RecordId, fields: &[String]) -> Result<Option<Record>> {
    cache.touch(id);
    cache.get(id).map(|record| shape(fields, record)).transpose()
}

/// Shallow merge: top-level patch fields overwrite, nested values are
/// replaced rather than merged
fn merge(record: &Record, patch: &Record) -> Record {
    let mut merged = record.clone();
    for (field, value) in patch {
        merged.insert(field.clone(), value.clone());
    }
    merged
}

/// Refuse a patch that would change the identity of any target record
fn check_identity(cache: &RecordCache, patch: &Record, targets: &[RecordId]) -> Result<()> {
    if !patch.contains_key(cache.id_field()) {
        return Ok(());
    }
    let patched = identity_of(patch, cache.id_field());
    for id in targets {
        if patched.as_ref() != Some(id) {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Patch would change identity of record {}", id),
            ));
        }
    }
    Ok(())
}

fn update(cache: &mut RecordCache, patch: &Record, targets: Vec<RecordId>) -> Result<Vec<Record>> {
    check_identity(cache, patch, &targets)?;

    let mut updated = Vec::with_capacity(targets.len());
    for id in targets {
        let Some(record) = cache.get(&id) else { continue };
        let merged = merge(record, patch);
        cache.replace(&id, merged.clone());
        updated.push(merged);
    }
    Ok(updated)
}

impl Operation for GetOne {
    type Output = Option<Record>;
    const MUTATES: bool = false;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output> {
        match select(cache, matchers, true)?.first() {
            Some(id) => read(cache, id, &self.fields),
            None => Ok(None),
        }
    }
}

impl Operation for GetAll {
    type Output = Vec<Record>;
    const MUTATES: bool = false;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output> {
        let mut found = Vec::new();
        for id in select(cache, matchers, false)? {
            if let Some(record) = read(cache, &id, &self.fields)? {
                found.push(record);
            }
        }
        Ok(found)
    }
}

impl Operation for UpdateOne {
    type Output = Option<Record>;
    const MUTATES: bool = true;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output> {
        let targets = select(cache, matchers, true)?;
        Ok(update(cache, &self.patch, targets)?.pop())
    }
}

impl Operation for UpdateAll {
    type Output = Vec<Record>;
    const MUTATES: bool = true;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output> {
        let targets = select(cache, matchers, false)?;
        update(cache, &self.patch, targets)
    }
}

impl Operation for DeleteOne {
    type Output = Option<Record>;
    const MUTATES: bool = true;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output> {
        Ok(select(cache, matchers, true)?
            .first()
            .and_then(|id| cache.remove(id)))
    }
}

impl Operation for DeleteAll {
    type Output = Vec<Record>;
    const MUTATES: bool = true;

    fn execute(&self, cache: &mut RecordCache, matchers: &[Matcher]) -> Result<Self::Output> {
        Ok(select(cache, matchers, false)?
            .iter()
            .filter_map(|id| cache.remove(id))
            .collect())
    }
}
