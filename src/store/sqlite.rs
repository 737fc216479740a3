use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use crate::db;

use super::{KeyValueStore, StoreError};

/// SQLite-backed store over the `kv_store` table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file and run pending migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Opened stability store");
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Ok(Self::from_connection(db::open_memory_database()?))
    }

    /// Wrap a connection whose migrations have already run.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(db::keys_with_prefix(&conn, prefix)?)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(db::get_value(&conn, key)?)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockFailed)?;
        db::set_value(&conn, key, value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::LockFailed)?;
        db::delete_value(&conn, key)?;
        Ok(())
    }
}
