use tracing::debug;
use crate::core::config::ResizePolicy;

/// Capacity bookkeeping for the record cache
#[derive(Debug, Clone)]
pub struct CapacityManager {
    max_size: usize,
    policy: ResizePolicy,
    resizes: u64,
}

impl CapacityManager {
    pub fn new(max_size: usize, policy: ResizePolicy) -> Self {
        CapacityManager {
            max_size: max_size.max(1),
            policy,
            resizes: 0,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn policy(&self) -> ResizePolicy {
        self.policy
    }

    pub fn resizes(&self) -> u64 {
        self.resizes
    }

    /// Occupancy as a fraction of capacity
    pub fn pressure(&self, occupied: usize) -> f64 {
        occupied as f64 / self.max_size as f64
    }

    /// Whether admitting one more identity requires evicting first
    pub fn must_evict(&self, occupied: usize) -> bool {
        self.policy == ResizePolicy::Fixed && occupied >= self.max_size
    }

    /// Grow capacity when occupancy passes the threshold. Returns the new
    /// capacity if it changed. Under `Fixed` capacity never moves.
    pub fn adapt(&mut self, occupied: usize) -> Option<usize> {
        let ResizePolicy::Dynamic { threshold } = self.policy else {
            return None;
        };

        if self.pressure(occupied) <= threshold {
            return None;
        }

        let grown = ((occupied as f64 / threshold).ceil() as usize).max(self.max_size + 1);
        debug!(from = self.max_size, to = grown, occupied, "Growing cache capacity");
        self.max_size = grown;
        self.resizes += 1;
        Some(grown)
    }
}
