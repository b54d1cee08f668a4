//! Chat operations that combine the backend with the local cache
//!
//! [`ChatService`] is what a chat screen talks to. Network calls go through
//! the authenticated [`ApiClient`]; the [`ChatStore`] is the source of truth
//! for message history and the fallback when the network is unavailable.
//!
//! Remote side effects that must not block the local operation (publishing
//! metadata, remote deletion) run through [`attempt_remote`].

use std::future::Future;

use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::chat::store::ChatStore;
use crate::chat::types::{sort_by_recency, ChatIndexEntry, ChatMessage, ChatTranscript};
use crate::error::{PantryError, Result};

/// Title used when a recipe hand-off carries none.
pub const DEFAULT_RECIPE_TITLE: &str = "Recipe";

/// Runs a best-effort remote operation.
///
/// The outcome is returned as `Some(value)` on success. A failure is logged
/// at `warn` with `label` and turned into `None`; it never propagates.
///
/// # Examples
///
/// ```
/// use pantrypal::chat::attempt_remote;
/// use pantrypal::error::PantryError;
///
/// # tokio_test::block_on(async {
/// let ok = attempt_remote("ping", async { Ok::<_, anyhow::Error>(42) }).await;
/// assert_eq!(ok, Some(42));
///
/// let failed = attempt_remote("ping", async {
///     Err::<u32, _>(anyhow::Error::from(PantryError::Network("offline".into())))
/// })
/// .await;
/// assert_eq!(failed, None);
/// # });
/// ```
pub async fn attempt_remote<T, F>(label: &str, op: F) -> Option<T>
where
    F: Future<Output = Result<T>>,
{
    match op.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(operation = label, error = %e, "Remote operation failed; continuing");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct AssistantReply {
    #[serde(default)]
    response: Option<String>,
}

/// Chat list, chat history and assistant exchanges.
#[derive(Clone)]
pub struct ChatService {
    client: ApiClient,
    store: ChatStore,
}

impl ChatService {
    /// Creates a service over an API client and a chat cache.
    pub fn new(client: ApiClient, store: ChatStore) -> Self {
        Self { client, store }
    }

    /// The underlying chat cache.
    pub fn store(&self) -> &ChatStore {
        &self.store
    }

    /// Returns the up-to-date chat list, most recent first.
    ///
    /// Fetches the server index and reconciles it into the cache (which is
    /// persisted). When the fetch or its decoding fails for any reason, the
    /// cached collection is returned sorted, and nothing is written.
    pub async fn list_chats(&self) -> Result<Vec<ChatTranscript>> {
        match self.fetch_index().await {
            Ok(index) => {
                let local = self.store.load_all().await?;
                self.store.reconcile(&index, local).await
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch chat index; using local cache");
                let mut local = self.store.load_all().await?;
                sort_by_recency(&mut local);
                Ok(local)
            }
        }
    }

    /// Returns the transcript for `id`, fetching it from the backend when it
    /// is not cached.
    ///
    /// A transcript fetched remotely is cached. Returns `Ok(None)` when
    /// neither side has it; the remote failure is logged.
    pub async fn open_chat(&self, id: &str) -> Result<Option<ChatTranscript>> {
        if let Some(chat) = self.store.get(id).await? {
            return Ok(Some(chat));
        }

        let path = format!("/chats/{}", id);
        let fetched = attempt_remote("fetch chat", async {
            self.client.get(&path).await?.json::<ChatTranscript>()
        })
        .await;

        match fetched {
            Some(chat) => {
                self.store.upsert(&chat).await?;
                Ok(Some(chat))
            }
            None => Ok(None),
        }
    }

    /// Deletes a chat remotely (best effort) and locally (always).
    pub async fn delete_chat(&self, id: &str) -> Result<()> {
        let path = format!("/chats/{}", id);
        attempt_remote("delete chat", self.client.delete(&path)).await;
        self.store.remove(id).await
    }

    /// Sends the chat's index entry to the backend.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors; callers that do not care wrap this in
    /// [`attempt_remote`].
    pub async fn publish_meta(&self, chat: &ChatTranscript) -> Result<()> {
        let entry = ChatIndexEntry::from_transcript(chat);
        self.client.post("/chats", &entry).await?;
        Ok(())
    }

    /// Starts a conversation from a recipe handed over by another screen.
    ///
    /// When `recipe` is JSON, the opening assistant message is a fenced
    /// `json` block of the pretty-printed recipe and the title is its
    /// `title` field. Otherwise the text itself is the opening message.
    /// Either way the title falls back to [`DEFAULT_RECIPE_TITLE`].
    pub async fn start_from_recipe(&self, recipe: &str) -> Result<ChatTranscript> {
        let (title, opening) = match serde_json::from_str::<Value>(recipe) {
            Ok(value) => {
                let title = value
                    .get("title")
                    .and_then(Value::as_str)
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or(DEFAULT_RECIPE_TITLE)
                    .to_string();
                let pretty = serde_json::to_string_pretty(&value).map_err(PantryError::from)?;
                (title, format!("```json\n{}\n```", pretty))
            }
            Err(_) => (DEFAULT_RECIPE_TITLE.to_string(), recipe.to_string()),
        };

        let mut chat = ChatTranscript::new(new_chat_id(), title);
        chat.messages.push(ChatMessage::assistant(opening));
        chat.touch();

        self.store.upsert(&chat).await?;
        attempt_remote("publish chat", self.publish_meta(&chat)).await;

        tracing::info!(chat_id = %chat.id, "Started chat from recipe");
        Ok(chat)
    }

    /// Starts an empty conversation, optionally tied to pantry items.
    pub async fn start_chat(&self, title: &str, context: Option<Vec<Value>>) -> Result<ChatTranscript> {
        let mut chat = ChatTranscript::new(new_chat_id(), title);
        chat.context = context;
        chat.touch();

        self.store.upsert(&chat).await?;
        attempt_remote("publish chat", self.publish_meta(&chat)).await;
        Ok(chat)
    }

    /// Appends a user message, asks the assistant, and records its reply.
    ///
    /// The updated transcript is cached and its metadata published (best
    /// effort).
    ///
    /// # Errors
    ///
    /// - `PantryError::InvalidInput` -- `text` is blank or `id` is unknown.
    /// - Any pipeline error from the assistant call. In that case nothing is
    ///   persisted.
    pub async fn send_message(&self, id: &str, text: &str) -> Result<ChatTranscript> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PantryError::InvalidInput("message is empty".to_string()).into());
        }

        let mut chat = self
            .open_chat(id)
            .await?
            .ok_or_else(|| PantryError::InvalidInput(format!("unknown chat: {}", id)))?;

        chat.messages.push(ChatMessage::user(text));

        let reply: AssistantReply = self
            .client
            .post("/openai/llm_chat", &json!({ "messages": chat.messages }))
            .await?
            .json()?;

        chat.messages
            .push(ChatMessage::assistant(reply.response.unwrap_or_default()));
        chat.touch();

        self.store.upsert(&chat).await?;
        attempt_remote("publish chat", self.publish_meta(&chat)).await;
        Ok(chat)
    }

    async fn fetch_index(&self) -> Result<Vec<ChatIndexEntry>> {
        self.client.get("/chats").await?.json()
    }
}

fn new_chat_id() -> String {
    Uuid::new_v4().simple().to_string()
}
