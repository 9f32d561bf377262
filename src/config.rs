use std::env;

/// Default fallback-tier capacity, matching the common browser local-storage ceiling.
pub const DEFAULT_FALLBACK_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Configuration shared by the tiers of one persistent store instance.
///
/// Two stores built from configs with different names never see each
/// other's entries, which keeps independent instances isolated in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Name of the primary-tier store (database file stem, Redis key prefix).
    pub store_name: String,

    /// Name of the table holding entries inside the store.
    pub table_name: String,

    /// Total bytes the fallback tier accepts before rejecting writes.
    pub fallback_quota_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_name: "fallback-kv".to_string(),
            table_name: "entries".to_string(),
            fallback_quota_bytes: DEFAULT_FALLBACK_QUOTA_BYTES,
        }
    }
}

impl StoreConfig {
    /// Create a config with the given store and table names and the default quota.
    pub fn new(store_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        StoreConfig {
            store_name: store_name.into(),
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Override the fallback-tier quota.
    pub fn with_fallback_quota(mut self, bytes: usize) -> Self {
        self.fallback_quota_bytes = bytes;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// - `FALLBACK_KV_STORE_NAME`
    /// - `FALLBACK_KV_TABLE_NAME`
    /// - `FALLBACK_KV_QUOTA_BYTES`
    ///
    /// Unset or unparseable values keep their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        StoreConfig {
            store_name: env::var("FALLBACK_KV_STORE_NAME").unwrap_or(defaults.store_name),
            table_name: env::var("FALLBACK_KV_TABLE_NAME").unwrap_or(defaults.table_name),
            fallback_quota_bytes: env::var("FALLBACK_KV_QUOTA_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.fallback_quota_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.store_name, "fallback-kv");
        assert_eq!(config.table_name, "entries");
        assert_eq!(config.fallback_quota_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn test_builder_overrides() {
        let config = StoreConfig::new("editor", "docs").with_fallback_quota(1024);
        assert_eq!(config.store_name, "editor");
        assert_eq!(config.table_name, "docs");
        assert_eq!(config.fallback_quota_bytes, 1024);
    }
}
