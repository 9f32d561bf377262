use async_trait::async_trait;
use fallback_kv::{PrimaryTier, StoreError};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// Generate an HTML document of roughly `bytes` bytes with random body text.
pub fn html_document(bytes: usize) -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(bytes.saturating_sub(26))
        .map(char::from)
        .collect();
    format!("<html><body>{}</body></html>", body)
}

/// Document keys `doc-0`..`doc-{count}`.
pub fn document_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("doc-{}", i)).collect()
}

/// A primary tier that is never reachable, forcing the fallback path.
pub struct UnreachablePrimary;

#[async_trait]
impl PrimaryTier for UnreachablePrimary {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::unavailable("unreachable"))
    }

    async fn put(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable("unreachable"))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::unavailable("unreachable"))
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        Err(StoreError::unavailable("unreachable"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_document_size() {
        let doc = html_document(1024);
        assert_eq!(doc.len(), 1024);
        assert!(doc.starts_with("<html><body>"));
    }

    #[test]
    fn test_document_keys() {
        let keys = document_keys(3);
        assert_eq!(keys, vec!["doc-0", "doc-1", "doc-2"]);
    }
}
