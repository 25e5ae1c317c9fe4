use crate::core::error::{Error, Result};
use crate::core::types::{Record, Value};

/// Resolve a dotted key-chain (`author.name`, `tags.0`) against a record.
///
/// Every segment must exist. Objects are entered by key, arrays by numeric
/// index; reaching a scalar before the last segment fails with `NotTraversable`.
pub fn resolve<'r>(key_chain: &str, record: &'r Record) -> Result<&'r Value> {
    let steps = walk(key_chain, record)?;
    match steps.last() {
        Some((_, value)) => Ok(*value),
        None => Err(Error::path_not_found(key_chain, key_chain)),
    }
}

/// Resolve every prefix of `key_chain`, returning each segment with the value
/// found at it. Projection uses the intermediate values to rebuild nesting.
pub fn walk<'k, 'r>(key_chain: &'k str, record: &'r Record) -> Result<Vec<(&'k str, &'r Value)>> {
    let mut segments = key_chain.split('.');
    let mut steps = Vec::new();

    let first = segments.next().unwrap_or(key_chain);
    let mut current = record
        .get(first)
        .ok_or_else(|| Error::path_not_found(first, first))?;
    steps.push((first, current));

    let mut walked = first.len();
    for segment in segments {
        walked += 1 + segment.len();
        let chain = &key_chain[..walked];
        current = child(current, segment, chain)?;
        steps.push((segment, current));
    }

    Ok(steps)
}

fn child<'v>(value: &'v Value, segment: &str, chain: &str) -> Result<&'v Value> {
    match value {
        Value::Object(map) => map
            .get(segment)
            .ok_or_else(|| Error::path_not_found(segment, chain)),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .ok_or_else(|| Error::path_not_found(segment, chain)),
        _ => Err(Error::not_traversable(segment, chain)),
    }
}
