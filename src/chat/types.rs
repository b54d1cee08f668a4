//! Chat data model
//!
//! Field names follow the backend's JSON (`updatedAt` in camelCase) so that
//! transcripts round-trip unchanged through both the local cache and the
//! `/chats` endpoints.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Message typed by the user
    User,
    /// Reply from the recipe assistant
    Assistant,
    /// Instruction injected by the client
    System,
}

/// One message of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: Role,
    /// Message text (may contain Markdown)
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A full, locally held conversation.
///
/// # Examples
///
/// ```
/// use pantrypal::chat::{ChatMessage, ChatTranscript};
///
/// let mut chat = ChatTranscript::new("c1", "Pasta night");
/// chat.messages.push(ChatMessage::user("What can I cook with basil?"));
///
/// let json = serde_json::to_value(&chat).unwrap();
/// assert_eq!(json["id"], "c1");
/// assert!(json.get("updatedAt").is_some());
/// assert!(json.get("context").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTranscript {
    /// Unique conversation identifier
    pub id: String,

    /// Display title
    pub title: String,

    /// Messages in conversation order
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Pantry items the conversation was generated from (opaque)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<Value>>,

    /// Last update time, ISO-8601
    pub updated_at: String,

    /// Message count reported by the server index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl ChatTranscript {
    /// Creates an empty transcript stamped with the current time.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            context: None,
            updated_at: now_timestamp(),
            length: None,
        }
    }

    /// Creates a transcript with no messages from a server index entry.
    pub fn shell_from_index(entry: &ChatIndexEntry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            messages: Vec::new(),
            context: None,
            updated_at: entry.updated_at.clone(),
            length: entry.length,
        }
    }

    /// Overwrites the server-authoritative fields from `entry`.
    ///
    /// Only `title`, `updated_at` and `length` change; `messages` and
    /// `context` are left as they are.
    pub fn apply_index(&mut self, entry: &ChatIndexEntry) {
        self.title = entry.title.clone();
        self.updated_at = entry.updated_at.clone();
        self.length = entry.length;
    }

    /// Sets `updated_at` to now and `length` to the message count.
    pub fn touch(&mut self) {
        self.updated_at = now_timestamp();
        self.length = Some(self.messages.len() as u64);
    }

    /// Parsed `updated_at`, if it is a recognised timestamp.
    pub fn updated_at_time(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.updated_at)
    }
}

/// The server's listing projection of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIndexEntry {
    /// Conversation identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Last update time, ISO-8601
    pub updated_at: String,
    /// Message count
    #[serde(default)]
    pub length: Option<u64>,
}

impl ChatIndexEntry {
    /// Index entry describing `chat`, with `length` set to its message count.
    pub fn from_transcript(chat: &ChatTranscript) -> Self {
        Self {
            id: chat.id.clone(),
            title: chat.title.clone(),
            updated_at: chat.updated_at.clone(),
            length: Some(chat.messages.len() as u64),
        }
    }
}

/// Current time as an RFC 3339 string with millisecond precision and `Z`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 timestamp.
///
/// Accepts RFC 3339, a date-time without offset (taken as UTC) and a bare
/// `YYYY-MM-DD` date (midnight UTC).
///
/// # Examples
///
/// ```
/// use pantrypal::chat::types::parse_timestamp;
///
/// let a = parse_timestamp("2024-03-01").unwrap();
/// let b = parse_timestamp("2024-03-01T00:00:00Z").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Sorts most recently updated first.
///
/// The sort is stable, so entries with equal timestamps keep their relative
/// order. Unparseable timestamps sort after every parseable one.
pub fn sort_by_recency(chats: &mut [ChatTranscript]) {
    chats.sort_by_key(|chat| std::cmp::Reverse(chat.updated_at_time()));
}
