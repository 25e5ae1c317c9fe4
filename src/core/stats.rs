use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::core::config::ResizePolicy;

/// Collection statistics for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    pub name: String,

    // Cache metrics
    pub size: usize,
    pub capacity: usize,
    pub policy: PolicyKind,
    pub evictions: u64,
    pub resizes: u64,
    pub index_entries: usize,

    // Durability metrics
    pub dirty: bool,
    pub pending_flushes: usize,
    pub flush_count: u64,
    pub last_flush_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PolicyKind {
    Fixed,
    Dynamic,
}

impl From<ResizePolicy> for PolicyKind {
    fn from(policy: ResizePolicy) -> Self {
        match policy {
            ResizePolicy::Fixed => PolicyKind::Fixed,
            ResizePolicy::Dynamic { .. } => PolicyKind::Dynamic,
        }
    }
}

impl CollectionStats {
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.size as f64 / self.capacity as f64
        }
    }
}
