use std::path::PathBuf;
use tracing::warn;
use crate::core::error::{Error, ErrorKind, Result};

pub const DEFAULT_MAX_CACHE_SIZE: usize = 500;
pub const DEFAULT_RESIZE_THRESHOLD: f64 = 0.8;

/// What happens when the cache reaches `max_cache_size`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizePolicy {
    /// Evict the least recently used record before admitting a new one
    Fixed,
    /// Grow capacity to `ceil(size / threshold)` once occupancy exceeds `threshold`
    Dynamic { threshold: f64 },
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::Dynamic { threshold: DEFAULT_RESIZE_THRESHOLD }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexedFields {
    All,
    Only(Vec<String>),
}

impl IndexedFields {
    pub fn contains(&self, field: &str) -> bool {
        match self {
            IndexedFields::All => true,
            IndexedFields::Only(fields) => fields.iter().any(|f| f == field),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub location: PathBuf,
    pub max_cache_size: usize,
    pub resize: ResizePolicy,
    pub id_field: String,
    pub indexed_fields: IndexedFields,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            location: PathBuf::from("db"),
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            resize: ResizePolicy::default(),
            id_field: "id".to_string(),
            indexed_fields: IndexedFields::All,
        }
    }
}

impl Config {
    pub fn at(location: impl Into<PathBuf>) -> Self {
        Config {
            location: location.into(),
            ..Config::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_cache_size == 0 {
            return Err(Error::new(
                ErrorKind::CapacityMisconfiguration,
                "max_cache_size must be at least 1".to_string(),
            ));
        }

        if let ResizePolicy::Dynamic { threshold } = self.resize {
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(Error::new(
                    ErrorKind::CapacityMisconfiguration,
                    format!("Resize threshold {} is outside (0, 1]", threshold),
                ));
            }
        }

        Ok(())
    }

    /// Fold capacity misconfiguration back into the defaults instead of failing
    pub fn normalized(mut self) -> Self {
        if self.max_cache_size == 0 {
            warn!(
                default = DEFAULT_MAX_CACHE_SIZE,
                "max_cache_size of 0 replaced by default"
            );
            self.max_cache_size = DEFAULT_MAX_CACHE_SIZE;
        }

        if let ResizePolicy::Dynamic { threshold } = self.resize {
            if !(threshold > 0.0 && threshold <= 1.0) {
                warn!(threshold, "Resize threshold out of range, using default");
                self.resize = ResizePolicy::Dynamic { threshold: DEFAULT_RESIZE_THRESHOLD };
            }
        }

        self
    }
}
