//! Tier implementations for the persistent store.

pub mod local;
pub mod memory;
pub mod metrics;
pub mod redis;
pub mod sqlite;

pub use local::{LocalStorage, LocalStorageConfig};
pub use memory::MemoryPrimary;
pub use metrics::{MetricsSink, MetricsTier, TierMetric};
pub use redis::{RedisPrimary, RedisPrimaryConfig};
pub use sqlite::SqlitePrimary;
