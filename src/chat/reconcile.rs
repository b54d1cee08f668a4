//! Merge of the server chat index into the local transcript collection

use std::collections::HashMap;

use crate::chat::types::{sort_by_recency, ChatIndexEntry, ChatTranscript};

/// Merges `server_index` into `local` and returns the result sorted by
/// recency.
///
/// - A local transcript reported by the server gets the server's `title`,
///   `updated_at` and `length`; its messages are never touched.
/// - An id only the server knows becomes a shell transcript with no
///   messages.
/// - Transcripts the server did not report are kept as they are.
///
/// Before sorting, local transcripts come first in their original order,
/// followed by server-only shells in index order. Duplicate local ids
/// collapse to the last occurrence, kept at the first occurrence's position.
///
/// # Examples
///
/// ```
/// use pantrypal::chat::{merge_index, ChatIndexEntry, ChatMessage, ChatTranscript};
///
/// let mut local = ChatTranscript::new("x", "Old title");
/// local.messages.push(ChatMessage::user("hi"));
///
/// let index = vec![ChatIndexEntry {
///     id: "x".into(),
///     title: "New title".into(),
///     updated_at: "2024-01-01T00:00:00Z".into(),
///     length: Some(1),
/// }];
///
/// let merged = merge_index(&index, vec![local]);
/// assert_eq!(merged[0].title, "New title");
/// assert_eq!(merged[0].messages.len(), 1);
/// ```
pub fn merge_index(server_index: &[ChatIndexEntry], local: Vec<ChatTranscript>) -> Vec<ChatTranscript> {
    let mut merged: Vec<ChatTranscript> = Vec::with_capacity(local.len() + server_index.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for chat in local {
        match positions.get(&chat.id) {
            Some(&pos) => merged[pos] = chat,
            None => {
                positions.insert(chat.id.clone(), merged.len());
                merged.push(chat);
            }
        }
    }

    for entry in server_index {
        match positions.get(&entry.id) {
            Some(&pos) => merged[pos].apply_index(entry),
            None => {
                positions.insert(entry.id.clone(), merged.len());
                merged.push(ChatTranscript::shell_from_index(entry));
            }
        }
    }

    sort_by_recency(&mut merged);
    merged
}
