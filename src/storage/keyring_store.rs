//! Credential persistence via OS keyring
//!
//! Each key becomes one keyring entry whose service name is the configured
//! application namespace and whose user name is the key itself, so
//! `userToken` and `refreshToken` are stored as separate secrets.

use async_trait::async_trait;

use crate::error::{PantryError, Result};
use crate::storage::KeyValueStore;

/// [`KeyValueStore`] backed by the operating system's credential store.
///
/// The keyring is stateless; this type only remembers the service name used
/// to namespace entries.
///
/// # Examples
///
/// ```no_run
/// use pantrypal::storage::{KeyValueStore, KeyringStore};
///
/// # async fn example() -> pantrypal::error::Result<()> {
/// let store = KeyringStore::new("pantrypal");
/// store.set("userToken", "eyJhbGciOi...").await?;
/// let token = store.get("userToken").await?;
/// assert!(token.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Creates an accessor for entries under `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Service name entries are stored under.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(|e| PantryError::Keyring(e).into())
    }
}

/// Runs a keyring call on the blocking pool; the OS credential service may
/// stall on IPC or an unlock prompt.
async fn run_blocking<T, F>(op: F) -> Result<keyring::Result<T>>
where
    T: Send + 'static,
    F: FnOnce() -> keyring::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| PantryError::Storage(format!("keyring task panicked: {e}")).into())
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self.entry(key)?;
        match run_blocking(move || entry.get_password()).await? {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(PantryError::Keyring(e).into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = self.entry(key)?;
        let value = value.to_string();
        run_blocking(move || entry.set_password(&value))
            .await?
            .map_err(PantryError::Keyring)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let entry = self.entry(key)?;
        match run_blocking(move || entry.delete_password()).await? {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(PantryError::Keyring(e).into()),
        }
    }
}
