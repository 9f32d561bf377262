//! Metrics middleware for primary tiers.
//!
//! This module provides a `MetricsTier` wrapper that emits a metric for every
//! primary-tier operation (reads, writes, deletes, listings) to a
//! user-provided sink.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fallback_kv::{LocalStorage, MemoryPrimary, MetricsTier, PersistentStore, PrimaryTier};
//!
//! let sink = Arc::new(MyMetricsSink::new());
//! let memory = Arc::new(MemoryPrimary::default());
//! let primary: Arc<dyn PrimaryTier> = Arc::new(MetricsTier::new(memory, sink.clone()));
//!
//! let store = PersistentStore::new(Some(primary), Arc::new(LocalStorage::default()));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

use crate::error::StoreError;
use crate::tier::PrimaryTier;
use crate::utils::elapsed_ms;

/// Metrics emitted by the MetricsTier wrapper.
#[derive(Debug, Clone)]
pub enum TierMetric {
    /// Emitted on every read (get) operation.
    Read {
        /// The key that was read.
        key: String,
        /// Whether the tier held a value.
        hit: bool,
        /// Whether the tier answered at all.
        ok: bool,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped tier (from PrimaryTier::name()).
        tier: String,
    },
    /// Emitted on every write (put) operation.
    Write {
        key: String,
        /// Size of the written value in bytes.
        bytes: usize,
        ok: bool,
        latency_ms: f64,
        tier: String,
    },
    /// Emitted on every delete operation.
    Delete {
        key: String,
        ok: bool,
        latency_ms: f64,
        tier: String,
    },
    /// Emitted on every key listing.
    List {
        /// Number of keys returned (0 on failure).
        count: usize,
        ok: bool,
        latency_ms: f64,
        tier: String,
    },
}

/// Trait for receiving tier metrics.
///
/// # Example
///
/// ```ignore
/// use std::sync::Mutex;
/// use async_trait::async_trait;
/// use fallback_kv::{MetricsSink, TierMetric};
///
/// struct BufferedSink {
///     buffer: Mutex<Vec<TierMetric>>,
/// }
///
/// #[async_trait]
/// impl MetricsSink for BufferedSink {
///     fn emit(&self, metric: TierMetric) {
///         self.buffer.lock().unwrap().push(metric);
///     }
///
///     async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Emit a single metric.
    ///
    /// This is called synchronously in the hot path of every tier operation.
    /// Implementations should be fast (e.g., buffer metrics in memory).
    fn emit(&self, metric: TierMetric);

    /// Flush any buffered metrics.
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A primary-tier wrapper that emits metrics for all operations.
///
/// Results from the inner tier are returned unchanged, errors included.
pub struct MetricsTier {
    inner: Arc<dyn PrimaryTier>,
    sink: Arc<dyn MetricsSink>,
    tier_name: String,
}

impl MetricsTier {
    /// Create a new MetricsTier wrapping the given tier.
    pub fn new(inner: Arc<dyn PrimaryTier>, sink: Arc<dyn MetricsSink>) -> Self {
        let tier_name = inner.name().to_string();
        MetricsTier {
            inner,
            sink,
            tier_name,
        }
    }

    /// Get a reference to the metrics sink.
    pub fn sink(&self) -> &Arc<dyn MetricsSink> {
        &self.sink
    }
}

#[async_trait]
impl PrimaryTier for MetricsTier {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let start = Instant::now();
        let result = self.inner.get(key).await;

        self.sink.emit(TierMetric::Read {
            key: key.to_string(),
            hit: matches!(result, Ok(Some(_))),
            ok: result.is_ok(),
            latency_ms: elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.inner.put(key, value).await;

        self.sink.emit(TierMetric::Write {
            key: key.to_string(),
            bytes: value.len(),
            ok: result.is_ok(),
            latency_ms: elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let start = Instant::now();
        let result = self.inner.delete(key).await;

        self.sink.emit(TierMetric::Delete {
            key: key.to_string(),
            ok: result.is_ok(),
            latency_ms: elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let start = Instant::now();
        let result = self.inner.keys().await;

        self.sink.emit(TierMetric::List {
            count: result.as_ref().map_or(0, Vec::len),
            ok: result.is_ok(),
            latency_ms: elapsed_ms(start),
            tier: self.tier_name.clone(),
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::memory::MemoryPrimary;
    use std::sync::Mutex;

    struct TestSink {
        metrics: Mutex<Vec<TierMetric>>,
    }

    impl TestSink {
        fn new() -> Self {
            TestSink {
                metrics: Mutex::new(Vec::new()),
            }
        }

        fn take_metrics(&self) -> Vec<TierMetric> {
            std::mem::take(&mut *self.metrics.lock().unwrap())
        }
    }

    #[async_trait]
    impl MetricsSink for TestSink {
        fn emit(&self, metric: TierMetric) {
            self.metrics.lock().unwrap().push(metric);
        }

        async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }
    }

    struct DownTier;

    #[async_trait]
    impl PrimaryTier for DownTier {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::connection("down", "refused"))
        }

        async fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::connection("down", "refused"))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::connection("down", "refused"))
        }

        async fn keys(&self) -> Result<Vec<String>, StoreError> {
            Err(StoreError::connection("down", "refused"))
        }
    }

    #[tokio::test]
    async fn test_read_miss() {
        let inner: Arc<dyn PrimaryTier> = Arc::new(MemoryPrimary::default());
        let sink = Arc::new(TestSink::new());
        let tier = MetricsTier::new(inner, sink.clone());

        assert!(tier.get("key1").await.unwrap().is_none());

        let metrics = sink.take_metrics();
        assert_eq!(metrics.len(), 1);

        match &metrics[0] {
            TierMetric::Read {
                key,
                hit,
                ok,
                latency_ms,
                tier,
            } => {
                assert_eq!(key, "key1");
                assert!(!hit);
                assert!(ok);
                assert_eq!(tier, "memory");
                assert!(*latency_ms >= 0.0);
            }
            _ => panic!("Expected Read metric"),
        }
    }

    #[tokio::test]
    async fn test_write_then_read_hit() {
        let inner: Arc<dyn PrimaryTier> = Arc::new(MemoryPrimary::default());
        let sink = Arc::new(TestSink::new());
        let tier = MetricsTier::new(inner, sink.clone());

        tier.put("key1", "value").await.unwrap();
        tier.get("key1").await.unwrap();

        let metrics = sink.take_metrics();
        assert_eq!(metrics.len(), 2);

        match &metrics[0] {
            TierMetric::Write { key, bytes, ok, .. } => {
                assert_eq!(key, "key1");
                assert_eq!(*bytes, 5);
                assert!(ok);
            }
            _ => panic!("Expected Write metric"),
        }
        match &metrics[1] {
            TierMetric::Read { hit, .. } => assert!(hit),
            _ => panic!("Expected Read metric"),
        }
    }

    #[tokio::test]
    async fn test_list_and_delete_metrics() {
        let inner: Arc<dyn PrimaryTier> = Arc::new(MemoryPrimary::default());
        let sink = Arc::new(TestSink::new());
        let tier = MetricsTier::new(inner, sink.clone());

        tier.put("a", "1").await.unwrap();
        tier.put("b", "2").await.unwrap();
        sink.take_metrics();

        tier.keys().await.unwrap();
        tier.delete("a").await.unwrap();

        let metrics = sink.take_metrics();
        match &metrics[0] {
            TierMetric::List { count, ok, .. } => {
                assert_eq!(*count, 2);
                assert!(ok);
            }
            _ => panic!("Expected List metric"),
        }
        match &metrics[1] {
            TierMetric::Delete { key, .. } => assert_eq!(key, "a"),
            _ => panic!("Expected Delete metric"),
        }
    }

    #[tokio::test]
    async fn test_failures_are_reported_and_passed_through() {
        let sink = Arc::new(TestSink::new());
        let tier = MetricsTier::new(Arc::new(DownTier), sink.clone());

        assert!(tier.get("k").await.is_err());
        assert!(tier.keys().await.is_err());

        let metrics = sink.take_metrics();
        match &metrics[0] {
            TierMetric::Read { ok, hit, tier, .. } => {
                assert!(!ok);
                assert!(!hit);
                assert_eq!(tier, "down");
            }
            _ => panic!("Expected Read metric"),
        }
        match &metrics[1] {
            TierMetric::List { ok, count, .. } => {
                assert!(!ok);
                assert_eq!(*count, 0);
            }
            _ => panic!("Expected List metric"),
        }
    }
}
