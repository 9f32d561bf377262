//! Example of an editor's persistence lifecycle.
//!
//! On start the editor migrates documents that older versions left in the
//! small fallback tier, restores the current document, then saves edits
//! through a debounced writer. Run it twice to see the document survive.
//!
//! Set `RUST_LOG=fallback_kv=debug` to watch tier decisions.

use fallback_kv::{
    DocumentSlot, FallbackTier, LocalStorage, PersistentStore, SqlitePrimary, StoreConfig,
    cold_start,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const LEGACY_KEYS: &[&str] = &["chathtml-code", "chathtml-settings"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = StoreConfig::from_env();
    let data_dir = std::env::temp_dir().join("fallback-kv-demo");
    std::fs::create_dir_all(&data_dir)?;

    // The fallback tier is file-backed so a legacy value can be seeded
    let fallback = Arc::new(LocalStorage::open(
        data_dir.join("local.json"),
        config.fallback_quota_bytes,
    )?);
    let primary = Arc::new(SqlitePrimary::new(&data_dir, &config)?);
    let store = PersistentStore::new(Some(primary), fallback.clone());

    // Only a first run looks like an upgrade from an older version
    if store.get("chathtml-code").await.is_none() {
        fallback.set_item("chathtml-code", "<html><body>OLD</body></html>")?;
    }

    let report = cold_start(&store, LEGACY_KEYS).await;
    println!(
        "Migration: moved={}, skipped={}, retained={}",
        report.moved, report.skipped, report.retained
    );

    let slot = DocumentSlot::new(store.clone(), "chathtml-code");
    let current = slot.load().await.unwrap_or_default();
    println!("Restored document ({} bytes): {}", current.len(), current);

    // Simulate a burst of keystrokes; only the last one is written
    let saver = slot.debounced(Duration::from_millis(250));
    for i in 1..=5 {
        saver.save(format!("<html><body>edit {}</body></html>", i));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    saver.flush().await;

    println!("Saved document: {:?}", slot.load().await);
    println!(
        "Documents: {:?}",
        store.keys_with_prefix("chathtml-").await.collect::<Vec<_>>()
    );
    println!("Fallback tier now holds {} key(s)", fallback.len());

    Ok(())
}
