//! Chat transcripts, their local cache and server synchronization
//!
//! - [`types`]: transcript and index data model
//! - [`reconcile`]: pure merge of a server index into local transcripts
//! - [`store`]: the persistent transcript collection
//! - [`sync`]: operations that combine the backend and the cache

pub mod reconcile;
pub mod store;
pub mod sync;
pub mod types;

pub use reconcile::merge_index;
pub use store::{ChatStore, CHATS_KEY};
pub use sync::{attempt_remote, ChatService};
pub use types::{ChatIndexEntry, ChatMessage, ChatTranscript, Role};
