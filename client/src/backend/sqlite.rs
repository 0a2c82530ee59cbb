//! Local SQLite backend
//!
//! A single `kv` table standing in for the contract during development.
//! Calls run on the blocking pool; the connection is shared behind a mutex.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{ClientError, Result};
use super::{KvBackend, TransactionAck};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value BLOB NOT NULL
)";

/// Backend persisting entries in a SQLite file
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteBackend {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ClientError::Config(format!("failed to create {}: {}", parent.display(), e)))?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute(SCHEMA, [])?;
        info!("Opened SQLite backend at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(SCHEMA, [])?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Path of the database file, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|e| ClientError::Transport(format!("SQLite connection poisoned: {}", e)))?;
            f(&*guard)
        })
        .await
        .map_err(|e| ClientError::Transport(format!("SQLite task failed: {}", e)))?
    }
}

#[async_trait]
impl KvBackend for SqliteBackend {
    async fn is_available(&self) -> Result<bool> {
        self.with_conn(|conn| {
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
        .await
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            let value: Option<Vec<u8>> = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
                .optional()?;
            Ok(value.unwrap_or_default())
        })
        .await
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TransactionAck> {
        let key = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            debug!("sqlite backend: set {}", key);
            Ok(TransactionAck::local())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let backend = SqliteBackend::open_in_memory().unwrap();

        assert!(backend.is_available().await.unwrap());
        assert!(backend.get_data("mood_keys").await.unwrap().is_empty());

        backend.set_data("mood_keys", br#"["a"]"#.to_vec()).await.unwrap();
        backend.set_data("mood_keys", br#"["a","b"]"#.to_vec()).await.unwrap();
        assert_eq!(backend.get_data("mood_keys").await.unwrap(), br#"["a","b"]"#.to_vec());
    }

    #[tokio::test]
    async fn test_file_backend_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("museum.db");

        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend.set_data("exhibit_x", b"{}".to_vec()).await.unwrap();
            assert_eq!(backend.path(), Some(path.as_path()));
        }

        let reopened = SqliteBackend::open(&path).unwrap();
        assert_eq!(reopened.get_data("exhibit_x").await.unwrap(), b"{}".to_vec());
    }
}
