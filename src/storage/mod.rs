//! Key-value storage ports
//!
//! Both persistent stores used by the client (the credential store and the
//! chat cache) are reached through the [`KeyValueStore`] capability rather
//! than through ambient globals. The concrete backend is chosen once, at
//! composition time, from [`StorageConfig`](crate::config::StorageConfig):
//!
//! - [`SledStore`] -- embedded `sled` database in the user's data directory;
//!   backs the chat cache and, with the `file` backend, the credentials too.
//! - [`KeyringStore`] -- OS native credential store (Keychain, Secret
//!   Service, Windows Credential Manager).
//! - [`MemoryStore`] -- process-local map for tests and throwaway sessions.
//!
//! None of the ports offer transactions. Read-modify-write sequences built on
//! top of them are not isolated from each other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::{CredentialBackend, StorageConfig};
use crate::error::Result;

pub mod keyring_store;
pub mod sled_store;

pub use keyring_store::KeyringStore;
pub use sled_store::SledStore;

/// Async get/set/delete capability over string keys and string values.
///
/// Implementations return `Ok(None)` from [`get`](Self::get) when the key has
/// never been written or was deleted, and treat deleting a missing key as a
/// no-op.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Missing keys are not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// In-memory [`KeyValueStore`].
///
/// # Examples
///
/// ```
/// use pantrypal::storage::{KeyValueStore, MemoryStore};
///
/// # tokio_test::block_on(async {
/// let store = MemoryStore::new();
/// store.set("greeting", "hello").await.unwrap();
/// assert_eq!(store.get("greeting").await.unwrap().as_deref(), Some("hello"));
/// store.delete("greeting").await.unwrap();
/// assert!(store.get("greeting").await.unwrap().is_none());
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` when no keys are held.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// The pair of stores the client runs on.
#[derive(Clone)]
pub struct Stores {
    /// Store holding the chat transcript collection.
    pub chats: Arc<dyn KeyValueStore>,
    /// Store holding access token, refresh token and user id.
    pub credentials: Arc<dyn KeyValueStore>,
}

/// Opens the chat and credential stores selected by `config`.
///
/// The chat cache always lives in a `sled` database under the resolved data
/// directory. Credentials go to the OS keyring, to that same database
/// (`file`), or to process memory (`memory`).
///
/// # Errors
///
/// Returns [`PantryError::Storage`](crate::error::PantryError::Storage) when
/// the data directory cannot be determined or the database cannot be opened.
pub fn open_stores(config: &StorageConfig) -> Result<Stores> {
    let data_dir = config.resolve_data_dir()?;
    let chats: Arc<dyn KeyValueStore> = Arc::new(SledStore::open(data_dir.join("cache"))?);

    let credentials: Arc<dyn KeyValueStore> = match config.credential_backend {
        CredentialBackend::Keyring => Arc::new(KeyringStore::new(&config.keyring_service)),
        CredentialBackend::File => Arc::clone(&chats),
        CredentialBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::debug!(
        data_dir = %data_dir.display(),
        backend = ?config.credential_backend,
        "Opened local stores"
    );

    Ok(Stores { chats, credentials })
}
