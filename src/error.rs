/// Error type for tier operations.
///
/// These errors never escape [`PersistentStore`](crate::PersistentStore); they
/// describe why a tier could not serve a request so the store can decide
/// whether to fall through to the next tier or swallow the failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The tier is not available in this environment.
    #[error("[{tier}] tier unavailable")]
    TierUnavailable { tier: String },
    /// Opening the tier failed.
    #[error("[{tier}] connection failed: {message}")]
    Connection { tier: String, message: String },
    /// A single read, write, delete or listing failed after connecting.
    #[error("[{tier}] transaction failed for key '{key}': {message}")]
    Transaction {
        tier: String,
        key: String,
        message: String,
    },
    /// The fallback tier rejected a write past its capacity.
    #[error("quota exceeded writing key '{key}': {requested} bytes requested, quota is {quota}")]
    QuotaExceeded {
        key: String,
        requested: usize,
        quota: usize,
    },
    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Create a new tier-unavailable error.
    pub fn unavailable(tier: impl Into<String>) -> Self {
        StoreError::TierUnavailable { tier: tier.into() }
    }

    /// Create a new connection error.
    pub fn connection(tier: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Connection {
            tier: tier.into(),
            message: message.into(),
        }
    }

    /// Create a new transaction error.
    pub fn transaction(
        tier: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StoreError::Transaction {
            tier: tier.into(),
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a fallback-tier capacity rejection.
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StoreError::QuotaExceeded { .. })
    }
}
