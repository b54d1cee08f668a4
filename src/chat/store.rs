//! Local chat cache
//!
//! The whole transcript collection is kept as one JSON array under
//! [`CHATS_KEY`]. Every mutation is a read-modify-write of that array.
//!
//! Read-modify-write cycles are not serialized. Two concurrent
//! [`ChatStore::upsert`] calls can both read the same collection and the
//! second write silently drops the first one's change (lost update). Callers
//! that need both updates must sequence them.

use std::sync::Arc;

use anyhow::Context;

use crate::chat::reconcile::merge_index;
use crate::chat::types::{ChatIndexEntry, ChatTranscript};
use crate::error::{PantryError, Result};
use crate::storage::KeyValueStore;

/// Storage key of the transcript collection.
pub const CHATS_KEY: &str = "ppal.chats";

/// Persistent collection of chat transcripts, most recent first by
/// convention.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pantrypal::chat::{ChatStore, ChatTranscript};
/// use pantrypal::storage::MemoryStore;
///
/// # tokio_test::block_on(async {
/// let store = ChatStore::new(Arc::new(MemoryStore::new()));
/// store.upsert(&ChatTranscript::new("c1", "Soup")).await.unwrap();
/// assert_eq!(store.get("c1").await.unwrap().unwrap().title, "Soup");
/// # });
/// ```
#[derive(Clone)]
pub struct ChatStore {
    store: Arc<dyn KeyValueStore>,
}

impl ChatStore {
    /// Wraps a storage port.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Loads the full collection.
    ///
    /// A missing record and a record that does not parse both yield an empty
    /// collection; the parse failure is logged, not returned.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the underlying read fails.
    pub async fn load_all(&self) -> Result<Vec<ChatTranscript>> {
        let Some(raw) = self.store.get(CHATS_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(chats) => Ok(chats),
            Err(e) => {
                tracing::warn!(error = %e, "Stored chat collection is unreadable; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the full collection.
    pub async fn save_all(&self, chats: &[ChatTranscript]) -> Result<()> {
        let json = serde_json::to_string(chats)
            .map_err(PantryError::from)
            .context("Failed to serialize chat collection")?;
        self.store.set(CHATS_KEY, &json).await
    }

    /// Replaces the transcript with the same id in place, or inserts `chat`
    /// at the front.
    pub async fn upsert(&self, chat: &ChatTranscript) -> Result<()> {
        let mut chats = self.load_all().await?;
        // Not atomic with the save below; see the module docs.
        match chats.iter_mut().find(|c| c.id == chat.id) {
            Some(existing) => *existing = chat.clone(),
            None => chats.insert(0, chat.clone()),
        }
        self.save_all(&chats).await
    }

    /// Looks up a transcript by id.
    pub async fn get(&self, id: &str) -> Result<Option<ChatTranscript>> {
        Ok(self.load_all().await?.into_iter().find(|c| c.id == id))
    }

    /// Removes the transcript with `id`, if present.
    pub async fn remove(&self, id: &str) -> Result<()> {
        let mut chats = self.load_all().await?;
        chats.retain(|c| c.id != id);
        self.save_all(&chats).await
    }

    /// Merges `server_index` into `local`, persists the result, and returns
    /// it sorted most recent first.
    ///
    /// See [`merge_index`] for the merge rules.
    pub async fn reconcile(
        &self,
        server_index: &[ChatIndexEntry],
        local: Vec<ChatTranscript>,
    ) -> Result<Vec<ChatTranscript>> {
        let merged = merge_index(server_index, local);
        self.save_all(&merged).await?;
        tracing::debug!(
            server = server_index.len(),
            merged = merged.len(),
            "Reconciled chat index"
        );
        Ok(merged)
    }
}
