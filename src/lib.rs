//! fallback-kv - Dual-tier string key-value persistence for Rust
//!
//! This library provides a storage abstraction that:
//! - Prefers a large-capacity asynchronous primary tier (SQLite, Redis, memory)
//! - Falls back to a small-capacity synchronous tier with a byte quota
//! - Never surfaces a storage failure to the caller
//! - Migrates legacy values from the fallback tier into the primary tier
//!
//! # Example
//!
//! ```ignore
//! use fallback_kv::{LocalStorage, PersistentStore, SqlitePrimary, StoreConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), fallback_kv::StoreError> {
//!     let config = StoreConfig::new("editor", "documents");
//!     let primary = Arc::new(SqlitePrimary::new("./data", &config)?);
//!     let fallback = Arc::new(LocalStorage::with_quota(config.fallback_quota_bytes));
//!
//!     let store = PersistentStore::new(Some(primary), fallback);
//!
//!     // Move values written by older versions out of the fallback tier
//!     store.migrate_key("chathtml-code").await;
//!
//!     store.set("chathtml-code", "<html>...</html>").await;
//!     let html = store.get("chathtml-code").await;
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod entry;
mod error;
mod persistent;
pub mod stores;
mod tier;
mod utils;

// Re-export public API
pub use config::{DEFAULT_FALLBACK_QUOTA_BYTES, StoreConfig};
pub use document::{DebouncedSaver, DocumentSlot, cold_start};
pub use entry::Entry;
pub use error::StoreError;
pub use persistent::{Keys, Migration, MigrationReport, PersistentStore};
pub use stores::local::{LocalStorage, LocalStorageConfig};
pub use stores::memory::MemoryPrimary;
pub use stores::metrics::{MetricsSink, MetricsTier, TierMetric};
pub use stores::redis::{RedisPrimary, RedisPrimaryConfig};
pub use stores::sqlite::SqlitePrimary;
pub use tier::{FallbackTier, PrimaryTier, TierOutcome};
