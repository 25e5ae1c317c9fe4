use tracing::debug;
use crate::core::error::Result;
use crate::core::types::RecordId;
use crate::memory::cache::RecordCache;
use crate::query::matcher::{matches, matches_all, Matcher};

/// Identities of records satisfying every matcher, in cache order.
///
/// A lone Equals on an indexed top-level field is answered from the field
/// index when the index covers every cached record; candidates are still
/// re-checked against the matcher. Everything else is a full scan, where the
/// first resolution failure aborts the whole selection.
pub fn select(cache: &RecordCache, matchers: &[Matcher], first_only: bool) -> Result<Vec<RecordId>> {
    if let [only] = matchers {
        if let Some((field, value)) = only.index_lookup() {
            let index = cache.index();
            if index.covers(field, cache.len()) {
                let candidates = cache.in_cache_order(index.lookup(field, value));
                debug!(field, candidates = candidates.len(), "Index lookup");
                return verify(cache, candidates, only, first_only);
            }
        }
    }

    let mut hits = Vec::new();
    for (id, record) in cache.iter() {
        if matches_all(record, matchers)? {
            hits.push(id.clone());
            if first_only {
                break;
            }
        }
    }
    Ok(hits)
}

fn verify(
    cache: &RecordCache,
    candidates: Vec<RecordId>,
    matcher: &Matcher,
    first_only: bool,
) -> Result<Vec<RecordId>> {
    let mut hits = Vec::new();
    for id in candidates {
        let Some(record) = cache.get(&id) else { continue };
        if matches(record, matcher)? {
            hits.push(id);
            if first_only {
                break;
            }
        }
    }
    Ok(hits)
}
