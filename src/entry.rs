use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A persisted entry as the primary tier stores it.
///
/// The record carries its own `key` so a listing of raw records can be
/// mapped back to caller keys without parsing the storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The unique caller-chosen identifier.
    pub key: String,

    /// The string payload, typically serialized HTML or JSON.
    pub value: String,
}

impl Entry {
    /// Create a new entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Encode the entry as a JSON record.
    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string(self)
            .map_err(|e| StoreError::Serialization(format!("Serialization failed: {}", e)))
    }

    /// Decode an entry from a JSON record.
    pub fn from_json(data: &str) -> Result<Self, StoreError> {
        serde_json::from_str(data)
            .map_err(|e| StoreError::Serialization(format!("Deserialization failed: {}", e)))
    }
}
