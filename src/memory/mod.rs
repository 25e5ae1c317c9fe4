pub mod adaptive;
pub mod cache;

pub use adaptive::CapacityManager;
pub use cache::RecordCache;
