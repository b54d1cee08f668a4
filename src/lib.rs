//! PantryPal - client core for the PantryPal backend
//!
//! This library provides the pieces a PantryPal client is built from: an
//! authenticated request pipeline with transparent token refresh, and a
//! local cache of recipe chats that is reconciled with the server.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `storage`: key-value storage port and its memory, sled and keyring backends
//! - `auth`: stored credentials and token extraction from auth responses
//! - `api`: the authenticated HTTP client
//! - `chat`: chat data model, local cache, reconcile and sync operations
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//! - `commands`: handlers behind the CLI subcommands
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pantrypal::{ApiClient, ChatService, ChatStore, Config, CredentialStore};
//! use pantrypal::storage::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
//!     let client = ApiClient::new(&config.api, credentials)?;
//!     client.sign_in("sam", "secret").await?;
//!
//!     let chats = ChatService::new(client, ChatStore::new(Arc::new(MemoryStore::new())));
//!     for chat in chats.list_chats().await? {
//!         println!("{} {}", chat.id, chat.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use api::{ApiClient, ApiResponse};
pub use auth::{CredentialPair, CredentialStore};
pub use chat::{ChatService, ChatStore, ChatTranscript};
pub use config::Config;
pub use error::{PantryError, Result};
pub use storage::KeyValueStore;
