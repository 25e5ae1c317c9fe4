use serde_json::Map;
use crate::core::error::Result;
use crate::core::types::{Record, Value};
use crate::query::path::walk;

/// Narrow `record` to the fields named by `key_chains`, keeping their nesting.
///
/// `["a.b"]` on `{a: {b: 1, c: 2}}` yields `{a: {b: 1}}`. Intermediate levels
/// are rebuilt as objects, or as arrays when the source held an array there
/// (skipped slots are `null`). Any chain that does not resolve fails the
/// whole projection.
pub fn project<S: AsRef<str>>(key_chains: &[S], record: &Record) -> Result<Record> {
    let mut output = Value::Object(Map::new());

    for chain in key_chains {
        let steps = walk(chain.as_ref(), record)?;
        place(&mut output, &steps);
    }

    match output {
        Value::Object(map) => Ok(map),
        _ => Ok(Record::new()),
    }
}

fn place(target: &mut Value, steps: &[(&str, &Value)]) {
    let Some((&(segment, source), rest)) = steps.split_first() else {
        return;
    };
    let Some(slot) = slot_mut(target, segment) else {
        return;
    };

    if rest.is_empty() {
        *slot = source.clone();
        return;
    }

    let fits = if source.is_array() { slot.is_array() } else { slot.is_object() };
    if !fits {
        *slot = if source.is_array() {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
    place(slot, rest);
}

fn slot_mut<'a>(target: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match target {
        Value::Object(map) => Some(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let idx: usize = segment.parse().ok()?;
            if items.len() <= idx {
                items.resize(idx + 1, Value::Null);
            }
            items.get_mut(idx)
        }
        _ => None,
    }
}
