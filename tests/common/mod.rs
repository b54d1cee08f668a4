use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Barrier;

use pantrypal::api::ApiClient;
use pantrypal::auth::{CredentialPair, CredentialStore};
use pantrypal::chat::{ChatService, ChatStore};
use pantrypal::config::ApiConfig;
use pantrypal::storage::{KeyValueStore, MemoryStore};
use pantrypal::{PantryError, Result};

/// Client pointed at `base_url`, with its credential backing store exposed.
#[allow(dead_code)]
pub fn memory_client(base_url: &str) -> (ApiClient, Arc<MemoryStore>) {
    memory_client_with_timeout(base_url, 5)
}

#[allow(dead_code)]
pub fn memory_client_with_timeout(base_url: &str, timeout_seconds: u64) -> (ApiClient, Arc<MemoryStore>) {
    let backing = Arc::new(MemoryStore::new());
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds,
    };
    let client = ApiClient::new(&config, CredentialStore::new(backing.clone()))
        .expect("failed to build client");
    (client, backing)
}

/// Stores a signed-in session directly, bypassing `/auth/login`.
#[allow(dead_code)]
pub async fn seed_session(client: &ApiClient, access: &str, refresh: Option<&str>) {
    client
        .credentials()
        .store_pair(&CredentialPair {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
        })
        .await
        .expect("failed to seed credentials");
}

/// Chat service over `base_url` with memory-backed credentials and cache.
#[allow(dead_code)]
pub fn memory_chat_service(base_url: &str) -> (ChatService, ApiClient, Arc<MemoryStore>) {
    let (client, _) = memory_client(base_url);
    let chat_backing = Arc::new(MemoryStore::new());
    let service = ChatService::new(client.clone(), ChatStore::new(chat_backing.clone()));
    (service, client, chat_backing)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Store whose reads wait until `parties` readers have arrived.
///
/// Forces concurrent read-modify-write cycles to interleave so that both
/// read the same snapshot before either writes.
#[allow(dead_code)]
pub struct LockstepStore {
    inner: Arc<MemoryStore>,
    barrier: Barrier,
}

#[allow(dead_code)]
impl LockstepStore {
    pub fn new(parties: usize) -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            barrier: Barrier::new(parties),
        }
    }

    /// The backing store, readable without waiting on the barrier.
    pub fn inner(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl KeyValueStore for LockstepStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self.inner.get(key).await?;
        self.barrier.wait().await;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }
}

/// Store whose writes to one key fail, as a full disk would.
#[allow(dead_code)]
pub struct FailingWriteStore {
    inner: Arc<MemoryStore>,
    failing_key: &'static str,
}

#[allow(dead_code)]
impl FailingWriteStore {
    pub fn new(failing_key: &'static str) -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            failing_key,
        }
    }

    pub fn inner(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.inner)
    }
}

#[async_trait]
impl KeyValueStore for FailingWriteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if key == self.failing_key {
            return Err(PantryError::Storage("disk full".to_string()).into());
        }
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.delete(key).await
    }
}

/// Client pointed at `base_url` whose credentials live in `store`.
#[allow(dead_code)]
pub fn client_over(base_url: &str, store: Arc<dyn KeyValueStore>) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
    };
    ApiClient::new(&config, CredentialStore::new(store)).expect("failed to build client")
}
