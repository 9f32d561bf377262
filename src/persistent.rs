use futures::future::join_all;
use std::sync::Arc;

use crate::tier::{FallbackTier, PrimaryTier, TierOutcome};

/// Keys returned by [`PersistentStore::keys_with_prefix`].
///
/// A finite, single-pass sequence in no particular order.
#[derive(Debug)]
pub struct Keys {
    inner: std::vec::IntoIter<String>,
}

impl Keys {
    fn new(keys: Vec<String>) -> Self {
        Keys {
            inner: keys.into_iter(),
        }
    }
}

impl Iterator for Keys {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Keys {}

/// What happened to one key during migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Migration {
    /// The fallback value was written to the primary tier and removed from the fallback tier.
    Moved,
    /// The fallback tier held nothing for the key.
    Skipped,
    /// The primary write failed; the fallback copy is still authoritative.
    Retained,
}

/// Summary of a [`PersistentStore::migrate_keys`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub moved: usize,
    pub skipped: usize,
    pub retained: usize,
}

impl MigrationReport {
    fn record(&mut self, migration: Migration) {
        match migration {
            Migration::Moved => self.moved += 1,
            Migration::Skipped => self.skipped += 1,
            Migration::Retained => self.retained += 1,
        }
    }
}

/// A string key-value store over a primary and a fallback tier.
///
/// The primary tier is always tried first; the fallback tier serves only
/// when the primary tier is missing or fails. Callers never learn which
/// tier answered, and no operation returns an error: tier failures are
/// logged and turned into the nearest successful-looking result (an absent
/// value, no keys, or a silent completion).
///
/// Once the primary tier accepts writes, new data is never written to the
/// fallback tier.
#[derive(Clone)]
pub struct PersistentStore {
    primary: Option<Arc<dyn PrimaryTier>>,
    fallback: Arc<dyn FallbackTier>,
}

impl PersistentStore {
    /// Create a new persistent store.
    ///
    /// Pass `None` for `primary` when the environment has no primary tier;
    /// every operation then goes straight to the fallback tier.
    ///
    /// # Example
    /// ```ignore
    /// let store = PersistentStore::new(
    ///     Some(Arc::new(SqlitePrimary::new(data_dir, &config)?)),
    ///     Arc::new(LocalStorage::with_quota(config.fallback_quota_bytes)),
    /// );
    /// ```
    pub fn new(primary: Option<Arc<dyn PrimaryTier>>, fallback: Arc<dyn FallbackTier>) -> Self {
        PersistentStore { primary, fallback }
    }

    /// Create a store with no primary tier.
    pub fn fallback_only(fallback: Arc<dyn FallbackTier>) -> Self {
        Self::new(None, fallback)
    }

    /// Whether a primary tier was configured.
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Return the value for `key`, or `None`.
    ///
    /// Reads the primary tier first. If it fails or holds nothing, returns
    /// whatever the fallback tier holds.
    pub async fn get(&self, key: &str) -> Option<String> {
        if let Some(primary) = &self.primary {
            match TierOutcome::from_result(primary.get(key).await) {
                TierOutcome::Value(value) => return Some(value),
                TierOutcome::Empty => {}
                TierOutcome::Failed(e) => {
                    tracing::debug!(
                        "Primary read failed, trying fallback: tier={}, key={}, error={}",
                        primary.name(),
                        key,
                        e
                    );
                }
            }
        }

        match TierOutcome::from_result(self.fallback.get_item(key)) {
            TierOutcome::Failed(e) => {
                tracing::warn!(
                    "Fallback read failed: tier={}, key={}, error={}",
                    self.fallback.name(),
                    key,
                    e
                );
                None
            }
            outcome => outcome.into_value(),
        }
    }

    /// Store `value` under `key`, overwriting any previous value.
    ///
    /// Writes the primary tier; only if that fails is the fallback tier
    /// written. A fallback failure, including a quota rejection, is logged
    /// and the value is lost.
    pub async fn set(&self, key: &str, value: &str) {
        if let Some(primary) = &self.primary {
            match primary.put(key, value).await {
                Ok(()) => return,
                Err(e) => {
                    tracing::debug!(
                        "Primary write failed, trying fallback: tier={}, key={}, error={}",
                        primary.name(),
                        key,
                        e
                    );
                }
            }
        }

        if let Err(e) = self.fallback.set_item(key, value) {
            tracing::warn!(
                "Failed to persist value: tier={}, key={}, bytes={}, error={}",
                self.fallback.name(),
                key,
                value.len(),
                e
            );
        }
    }

    /// Delete `key` from both tiers.
    ///
    /// Each tier is attempted regardless of the other's result. Removing an
    /// absent key is a no-op.
    pub async fn remove(&self, key: &str) {
        if let Some(primary) = &self.primary {
            if let Err(e) = primary.delete(key).await {
                tracing::warn!(
                    "Failed to remove from primary: tier={}, key={}, error={}",
                    primary.name(),
                    key,
                    e
                );
            }
        }

        if let Err(e) = self.fallback.remove_item(key) {
            tracing::warn!(
                "Failed to remove from fallback: tier={}, key={}, error={}",
                self.fallback.name(),
                key,
                e
            );
        }
    }

    /// Return every key starting with `prefix`.
    ///
    /// Keys come from the primary tier when it can list them, otherwise from
    /// the fallback tier. The tiers are never merged, so a key that exists
    /// only in the fallback tier is not returned while the primary tier is
    /// available.
    pub async fn keys_with_prefix(&self, prefix: &str) -> Keys {
        if let Some(primary) = &self.primary {
            match primary.keys().await {
                Ok(keys) => {
                    return Keys::new(keys.into_iter().filter(|k| k.starts_with(prefix)).collect());
                }
                Err(e) => {
                    tracing::debug!(
                        "Primary key listing failed, scanning fallback: tier={}, prefix={}, error={}",
                        primary.name(),
                        prefix,
                        e
                    );
                }
            }
        }

        let keys = self
            .fallback
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        Keys::new(keys)
    }

    /// Move a legacy value for `key` from the fallback tier to the primary tier.
    ///
    /// The fallback copy is removed only after the primary write succeeds.
    /// Any value already in the primary tier is overwritten. Calling this
    /// when the fallback tier holds nothing for `key` does nothing, so it is
    /// safe to run on every start. The returned [`Migration`] says which of
    /// those happened.
    pub async fn migrate_key(&self, key: &str) -> Migration {
        self.migrate(key).await
    }

    /// Migrate several legacy keys concurrently and report what happened.
    pub async fn migrate_keys<S: AsRef<str>>(&self, keys: &[S]) -> MigrationReport {
        let results = join_all(keys.iter().map(|key| self.migrate(key.as_ref()))).await;

        let mut report = MigrationReport::default();
        for migration in results {
            report.record(migration);
        }

        tracing::debug!(
            "Migration finished: moved={}, skipped={}, retained={}",
            report.moved,
            report.skipped,
            report.retained
        );
        report
    }

    async fn migrate(&self, key: &str) -> Migration {
        let value = match TierOutcome::from_result(self.fallback.get_item(key)) {
            TierOutcome::Value(value) => value,
            TierOutcome::Empty => return Migration::Skipped,
            TierOutcome::Failed(e) => {
                tracing::warn!(
                    "Failed to read legacy value: tier={}, key={}, error={}",
                    self.fallback.name(),
                    key,
                    e
                );
                return Migration::Skipped;
            }
        };

        let Some(primary) = &self.primary else {
            return Migration::Retained;
        };

        if let Err(e) = primary.put(key, &value).await {
            tracing::warn!(
                "Failed to migrate legacy value, keeping fallback copy: tier={}, key={}, error={}",
                primary.name(),
                key,
                e
            );
            return Migration::Retained;
        }

        if let Err(e) = self.fallback.remove_item(key) {
            tracing::warn!(
                "Migrated value but failed to clear fallback copy: tier={}, key={}, error={}",
                self.fallback.name(),
                key,
                e
            );
        }

        tracing::debug!(
            "Migrated legacy value: from={}, to={}, key={}, bytes={}",
            self.fallback.name(),
            primary.name(),
            key,
            value.len()
        );
        Migration::Moved
    }
}
