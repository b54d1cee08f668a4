//! `sled`-backed key-value store
//!
//! Values are stored as UTF-8 bytes under the key's UTF-8 bytes in the
//! default tree. Every write is flushed before returning so that a crash
//! right after a save does not lose the cache.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sled::Db;

use crate::error::{PantryError, Result};
use crate::storage::KeyValueStore;

/// Persistent [`KeyValueStore`] on an embedded `sled` database.
///
/// # Examples
///
/// ```
/// use pantrypal::storage::{KeyValueStore, SledStore};
///
/// # tokio_test::block_on(async {
/// let dir = tempfile::tempdir().unwrap();
/// let store = SledStore::open(dir.path().join("cache")).unwrap();
/// store.set("ppal.chats", "[]").await.unwrap();
/// assert_eq!(store.get("ppal.chats").await.unwrap().as_deref(), Some("[]"));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    path: PathBuf,
}

impl SledStore {
    /// Open or create a database at `path`
    ///
    /// # Errors
    ///
    /// Returns `PantryError::Storage` if the database cannot be opened, for
    /// example because another process holds its lock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path)
            .map_err(|e| PantryError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db, path })
    }

    /// Filesystem location of the database.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KeyValueStore for SledStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| PantryError::Storage(format!("Get failed: {}", e)))?;

        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    PantryError::Storage(format!("Value for '{}' is not UTF-8: {}", key, e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| PantryError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| PantryError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| PantryError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush_async()
            .await
            .map_err(|e| PantryError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}
