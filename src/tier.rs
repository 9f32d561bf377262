use async_trait::async_trait;

use crate::error::StoreError;

/// The preferred, large-capacity, asynchronous backing store.
///
/// Implementations open (or create) their named store and table on every
/// call and release the connection before returning. No connection is held
/// across calls, so there is no shared handle to lock.
#[async_trait]
pub trait PrimaryTier: Send + Sync {
    /// A name for logs and metrics.
    ///
    /// # Example
    /// - "memory"
    /// - "sqlite"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Return the stored value.
    ///
    /// The response must be `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store the value, overwriting any existing value for the key.
    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// List every key in the table, in no particular order.
    async fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// The small-capacity, synchronous backing store.
///
/// Access never suspends. Writes may be rejected with
/// [`StoreError::QuotaExceeded`] once the store's capacity is reached.
pub trait FallbackTier: Send + Sync {
    /// A name for logs.
    fn name(&self) -> &'static str;

    /// Return the stored value, `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store the value, overwriting any existing value for the key.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Number of stored keys.
    fn len(&self) -> usize;

    /// Whether the tier holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key at position `index`, `None` past the end.
    ///
    /// Positions are only stable while the tier is not mutated.
    fn key(&self, index: usize) -> Option<String>;

    /// Every stored key.
    ///
    /// The default walks `key(0..len())`; implementations that can list
    /// their keys in one pass should override it.
    fn keys(&self) -> Vec<String> {
        (0..self.len()).filter_map(|i| self.key(i)).collect()
    }
}

/// Outcome of a single tier read.
///
/// Public store operations match on this to decide between falling through
/// to the next tier and swallowing a terminal failure.
#[derive(Debug)]
pub enum TierOutcome {
    /// The tier holds a value for the key.
    Value(String),
    /// The tier answered and holds nothing for the key.
    Empty,
    /// The tier could not answer.
    Failed(StoreError),
}

impl TierOutcome {
    /// Classify a tier read result.
    pub fn from_result(result: Result<Option<String>, StoreError>) -> Self {
        match result {
            Ok(Some(value)) => TierOutcome::Value(value),
            Ok(None) => TierOutcome::Empty,
            Err(e) => TierOutcome::Failed(e),
        }
    }

    /// The value, discarding the reason for its absence.
    pub fn into_value(self) -> Option<String> {
        match self {
            TierOutcome::Value(value) => Some(value),
            TierOutcome::Empty | TierOutcome::Failed(_) => None,
        }
    }
}
