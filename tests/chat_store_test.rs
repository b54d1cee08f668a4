//! Local chat cache integration tests
//!
//! Covers the cache over the embedded database (persistence across reopen),
//! the reconcile merge end to end, and the documented lost-update behaviour
//! of concurrent upserts.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use common::LockstepStore;
use pantrypal::chat::{ChatIndexEntry, ChatMessage, ChatStore, ChatTranscript, CHATS_KEY};
use pantrypal::storage::{KeyValueStore, SledStore};

fn chat(id: &str, updated_at: &str, messages: &[&str]) -> ChatTranscript {
    ChatTranscript {
        id: id.to_string(),
        title: format!("Chat {id}"),
        messages: messages.iter().map(|m| ChatMessage::user(*m)).collect(),
        context: None,
        updated_at: updated_at.to_string(),
        length: None,
    }
}

fn entry(id: &str, title: &str, updated_at: &str) -> ChatIndexEntry {
    ChatIndexEntry {
        id: id.to_string(),
        title: title.to_string(),
        updated_at: updated_at.to_string(),
        length: None,
    }
}

fn ids(chats: &[ChatTranscript]) -> Vec<&str> {
    chats.iter().map(|c| c.id.as_str()).collect()
}

#[tokio::test]
async fn test_chats_survive_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("cache");

    {
        let store = ChatStore::new(Arc::new(SledStore::open(&db_path).unwrap()));
        store.upsert(&chat("a", "2024-01-01", &["hello"])).await.unwrap();
        store.upsert(&chat("b", "2024-01-02", &[])).await.unwrap();
    }

    let reopened = ChatStore::new(Arc::new(SledStore::open(&db_path).unwrap()));
    let chats = reopened.load_all().await.unwrap();
    assert_eq!(ids(&chats), vec!["b", "a"]);
    assert_eq!(chats[1].messages, vec![ChatMessage::user("hello")]);
}

#[tokio::test]
async fn test_collection_is_stored_under_single_key() {
    let dir = TempDir::new().unwrap();
    let backing = Arc::new(SledStore::open(dir.path().join("cache")).unwrap());
    let store = ChatStore::new(backing.clone());

    store.upsert(&chat("a", "2024-01-01", &[])).await.unwrap();

    let raw = backing.get(CHATS_KEY).await.unwrap().unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded[0]["id"], "a");
    assert_eq!(decoded[0]["updatedAt"], "2024-01-01");
}

#[tokio::test]
async fn test_reconcile_merges_updates_and_appends_shells() {
    let dir = TempDir::new().unwrap();
    let store = ChatStore::new(Arc::new(SledStore::open(dir.path().join("cache")).unwrap()));

    let local = vec![
        chat("a", "2024-01-01", &["x"]),
        chat("b", "2024-01-02", &["y", "z"]),
    ];
    let index = vec![
        entry("b", "Renamed b", "2024-03-01"),
        entry("c", "Only on server", "2024-02-01"),
    ];

    let merged = store.reconcile(&index, local).await.unwrap();

    assert_eq!(ids(&merged), vec!["b", "c", "a"]);
    assert_eq!(merged[0].title, "Renamed b");
    assert_eq!(merged[0].messages.len(), 2);
    assert!(merged[1].messages.is_empty());
    assert_eq!(merged[2].title, "Chat a");

    assert_eq!(store.load_all().await.unwrap(), merged);
}

#[tokio::test]
async fn test_reconcile_with_empty_index_keeps_local() {
    let dir = TempDir::new().unwrap();
    let store = ChatStore::new(Arc::new(SledStore::open(dir.path().join("cache")).unwrap()));

    let merged = store
        .reconcile(&[], vec![chat("old", "2023-01-01", &[]), chat("new", "2024-01-01", &[])])
        .await
        .unwrap();

    assert_eq!(ids(&merged), vec!["new", "old"]);
}

#[tokio::test]
async fn test_reconcile_is_idempotent() {
    let store = ChatStore::new(Arc::new(pantrypal::storage::MemoryStore::new()));
    let index = vec![entry("a", "A", "2024-02-01"), entry("s", "S", "2024-01-01")];

    let once = store
        .reconcile(&index, vec![chat("a", "2024-01-01", &["m"])])
        .await
        .unwrap();
    let twice = store.reconcile(&index, once.clone()).await.unwrap();

    assert_eq!(once, twice);
}

/// Two upserts that read the same snapshot: the second save overwrites the
/// first, so exactly one of the two chats survives.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_upserts_lose_an_update() {
    let lockstep = Arc::new(LockstepStore::new(2));
    let store = ChatStore::new(lockstep.clone());

    let first = chat("first", "2024-01-01", &[]);
    let second = chat("second", "2024-01-02", &[]);

    let (a, b) = tokio::join!(store.upsert(&first), store.upsert(&second));
    a.unwrap();
    b.unwrap();

    let survivors = ChatStore::new(lockstep.inner()).load_all().await.unwrap();
    assert_eq!(survivors.len(), 1);
    assert!(survivors[0].id == "first" || survivors[0].id == "second");
}
