//! Persistence for a single named document.
//!
//! A [`DocumentSlot`] binds a [`PersistentStore`] to one key, the way an
//! editor keeps its current document: load on start, save on every change.
//! [`DebouncedSaver`] coalesces a burst of changes into one write.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::persistent::{MigrationReport, PersistentStore};

/// One named document inside a persistent store.
#[derive(Clone)]
pub struct DocumentSlot {
    store: PersistentStore,
    key: Arc<str>,
}

impl DocumentSlot {
    /// Create a slot for `key`.
    pub fn new(store: PersistentStore, key: impl Into<Arc<str>>) -> Self {
        DocumentSlot {
            store,
            key: key.into(),
        }
    }

    /// The key this slot reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored content.
    pub async fn load(&self) -> Option<String> {
        self.store.get(&self.key).await
    }

    /// Move any legacy copy of this document into the primary tier, then load it.
    pub async fn restore(&self) -> Option<String> {
        self.store.migrate_key(&self.key).await;
        self.load().await
    }

    /// Store `content` immediately.
    pub async fn save(&self, content: &str) {
        self.store.set(&self.key, content).await;
    }

    /// Delete the stored content.
    pub async fn clear(&self) {
        self.store.remove(&self.key).await;
    }

    /// Start a background saver that writes at most once per quiet period of `delay`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn debounced(&self, delay: Duration) -> DebouncedSaver {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_saver(self.clone(), delay, rx));
        DebouncedSaver { tx }
    }
}

enum Command {
    Save(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to a debounced background writer for one [`DocumentSlot`].
///
/// Content passed to [`save`](DebouncedSaver::save) is written once no newer
/// content has arrived for the configured delay; intermediate versions are
/// dropped. Dropping the handle writes any pending content and stops the
/// background task.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<Command>,
}

impl DebouncedSaver {
    /// Queue `content` to be written after the quiet period.
    pub fn save(&self, content: impl Into<String>) {
        if self.tx.send(Command::Save(content.into())).is_err() {
            tracing::warn!("Debounced saver stopped, dropping content");
        }
    }

    /// Write any pending content now and wait for the write to finish.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run_saver(slot: DocumentSlot, delay: Duration, mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut pending: Option<String> = None;

    loop {
        let command = if pending.is_some() {
            match tokio::time::timeout(delay, rx.recv()).await {
                Ok(command) => command,
                Err(_) => {
                    // Quiet period elapsed
                    if let Some(content) = pending.take() {
                        slot.save(&content).await;
                    }
                    continue;
                }
            }
        } else {
            rx.recv().await
        };

        match command {
            Some(Command::Save(content)) => pending = Some(content),
            Some(Command::Flush(ack)) => {
                if let Some(content) = pending.take() {
                    slot.save(&content).await;
                }
                let _ = ack.send(());
            }
            None => {
                if let Some(content) = pending.take() {
                    slot.save(&content).await;
                }
                tracing::debug!("Debounced saver stopped: key={}", slot.key());
                return;
            }
        }
    }
}

/// Migrate every legacy key once at application start.
pub async fn cold_start<S: AsRef<str>>(store: &PersistentStore, legacy_keys: &[S]) -> MigrationReport {
    store.migrate_keys(legacy_keys).await
}
