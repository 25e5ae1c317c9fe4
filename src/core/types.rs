use std::fmt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number};
use crate::core::error::{Error, ErrorKind, Result};

pub use serde_json::Value;

/// One stored record: a nested mapping from field names to scalars, arrays or
/// further mappings.
pub type Record = Map<String, Value>;

/// Stable identity of a record inside a collection.
///
/// Text and numeric identities live in separate spaces, so `"1"` and `1` are
/// two records. Numbers are keyed by value: `1` and `1.0` are the same record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordId {
    Text(String),
    Number(String),
}

impl RecordId {
    /// Identity carried by a field value. Only strings and finite numbers qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RecordId::Text(s.clone())),
            Value::Number(n) => number_key(n).map(RecordId::Number),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordId::Text(s) => write!(f, "{:?}", s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Number(id.to_string())
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, RecordId::Text(s) if s == other)
    }
}

/// Canonical text of a number: integral values print without a fraction so
/// `2` and `2.0` share a key.
pub fn number_key(n: &Number) -> Option<String> {
    match (n.as_i64(), n.as_u64(), n.as_f64()) {
        (Some(i), _, _) => Some(i.to_string()),
        (_, Some(u), _) => Some(u.to_string()),
        (_, _, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some((f as i64).to_string())
        }
        (_, _, Some(f)) if f.is_finite() => Some(f.to_string()),
        _ => None,
    }
}

/// Extract the identity of `record` from `id_field`. Missing, null, bool,
/// array and object values have no usable identity.
pub fn identity_of(record: &Record, id_field: &str) -> Option<RecordId> {
    RecordId::from_value(record.get(id_field)?)
}

/// Convert a caller struct into a record. The value must serialize to a JSON object.
pub fn to_record<T: Serialize>(value: &T) -> Result<Record> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Expected an object, got {}", other),
        )),
    }
}

pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

/// Source of collision-resistant opaque identities. Callers invoke it before
/// `insert`; the store never generates identities itself.
pub trait IdGenerator: Send + Sync {
    /// Fresh text to store in the identity field
    fn generate(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub fn auto_id() -> String {
    UuidGenerator.generate()
}
