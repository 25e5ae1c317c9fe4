pub mod types;
pub mod collection;
pub mod config;
pub mod error;
pub mod stats;
