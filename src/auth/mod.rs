//! Credential handling
//!
//! - [`credentials`]  -- access/refresh token and user id persistence on a
//!   [`KeyValueStore`](crate::storage::KeyValueStore), including recognition
//!   of storage-layer "absent" sentinels
//! - [`token_fields`] -- ordered-preference extraction of token fields from
//!   backend responses whose field casing is not stable

pub mod credentials;
pub mod token_fields;

pub use credentials::{CredentialPair, CredentialStore};
