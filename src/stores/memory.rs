use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::entry::Entry;
use crate::error::StoreError;
use crate::tier::PrimaryTier;
use crate::utils::build_record_key;

/// In-process asynchronous primary tier.
///
/// Entries live in a `HashMap` behind a tokio `RwLock`, namespaced by the
/// config's store and table names. Clones share the same backing map, and
/// [`MemoryPrimary::for_table`] opens another table over it, so several
/// stores can be pointed at one process-wide "database".
///
/// Suitable for:
/// - Tests that need a primary tier with no external resources
/// - Embedding where durability is not required
#[derive(Clone)]
pub struct MemoryPrimary {
    state: Arc<RwLock<HashMap<String, Entry>>>,
    namespace: String,
}

impl MemoryPrimary {
    /// Create a new, empty MemoryPrimary for the given configuration.
    pub fn new(config: &StoreConfig) -> Self {
        MemoryPrimary {
            state: Arc::new(RwLock::new(HashMap::new())),
            namespace: build_record_key(&config.store_name, &config.table_name, ""),
        }
    }

    /// Open another table over the same backing map.
    pub fn for_table(&self, config: &StoreConfig) -> Self {
        MemoryPrimary {
            state: Arc::clone(&self.state),
            namespace: build_record_key(&config.store_name, &config.table_name, ""),
        }
    }

    fn record_key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }
}

impl Default for MemoryPrimary {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

#[async_trait]
impl PrimaryTier for MemoryPrimary {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .get(&self.record_key(key))
            .map(|entry| entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.insert(self.record_key(key), Entry::new(key, value));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.remove(&self.record_key(key));
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .iter()
            .filter(|(record_key, _)| record_key.starts_with(&self.namespace))
            .map(|(_, entry)| entry.key.clone())
            .collect())
    }
}
