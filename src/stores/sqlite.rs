use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::tier::PrimaryTier;

const TIER: &str = "sqlite";

/// Durable primary tier backed by a SQLite database file.
///
/// The database file is `{dir}/{store_name}.sqlite3` and entries live in a
/// table named after `table_name` with one row per entry (`key`, `value`).
/// Every operation opens the file, creates the table if it does not exist
/// yet, runs one statement and closes the connection again. The blocking
/// work runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SqlitePrimary {
    path: Arc<PathBuf>,
    table: Arc<str>,
}

impl SqlitePrimary {
    /// Create a SqlitePrimary storing its database under `dir`.
    ///
    /// The store name must be a single file-name component: empty names,
    /// `.`, `..` and names containing a path separator are rejected.
    /// Nothing is opened until the first operation.
    pub fn new(dir: impl AsRef<Path>, config: &StoreConfig) -> Result<Self, StoreError> {
        validate_store_name(&config.store_name)?;

        let path = dir.as_ref().join(format!("{}.sqlite3", config.store_name));
        Ok(SqlitePrimary {
            path: Arc::new(path),
            table: Arc::from(quote_identifier(&config.table_name)),
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the database and create the entries table, idempotently.
    fn open(path: &Path, table: &str) -> Result<Connection, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::connection(TIER, format!("open {}: {}", path.display(), e)))?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;
             CREATE TABLE IF NOT EXISTS {table} (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
             );"
        ))
        .map_err(|e| StoreError::connection(TIER, format!("create table {}: {}", table, e)))?;
        Ok(conn)
    }

    /// Run `op` against a fresh connection on the blocking pool.
    async fn with_connection<T, F>(&self, key: &str, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &str) -> rusqlite::Result<T> + Send + 'static,
    {
        let path = Arc::clone(&self.path);
        let table = Arc::clone(&self.table);
        let key_owned = key.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = Self::open(&path, &table)?;
            op(&conn, &table).map_err(|e| StoreError::transaction(TIER, key_owned, e.to_string()))
        })
        .await
        .map_err(|e| StoreError::transaction(TIER, key, format!("blocking task failed: {}", e)))?
    }
}

fn validate_store_name(name: &str) -> Result<(), StoreError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\', '\0']) => Ok(()),
        _ => Err(StoreError::connection(
            TIER,
            format!("invalid store name '{}': must be a plain file name", name),
        )),
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[async_trait]
impl PrimaryTier for SqlitePrimary {
    fn name(&self) -> &'static str {
        TIER
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let k = key.to_string();
        self.with_connection(key, move |conn, table| {
            conn.query_row(
                &format!("SELECT value FROM {table} WHERE key = ?1"),
                params![k],
                |row| row.get(0),
            )
            .optional()
        })
        .await
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let k = key.to_string();
        let v = value.to_string();
        self.with_connection(key, move |conn, table| {
            conn.execute(
                &format!(
                    "INSERT INTO {table} (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value"
                ),
                params![k, v],
            )
            .map(|_| ())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let k = key.to_string();
        self.with_connection(key, move |conn, table| {
            conn.execute(&format!("DELETE FROM {table} WHERE key = ?1"), params![k])
                .map(|_| ())
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.with_connection("*", |conn, table| {
            let mut stmt = conn.prepare(&format!("SELECT key FROM {table}"))?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(keys)
        })
        .await
    }
}
