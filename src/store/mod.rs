//! Persistence port for baselines and score history.
//!
//! The engine never touches storage. Orchestration code loads and saves through
//! a [`KeyValueStore`], which is injected rather than reached through a global.

pub mod memory;
pub mod repository;
pub mod sqlite;

pub use memory::MemoryStore;
pub use repository::BaselineRepository;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    LockFailed,
}

/// String key-value storage. Implementations must be safe to share across threads.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or overwrite.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}
