//! Error types for PantryPal
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.
//!
//! Fallible functions return the crate-wide [`Result`] alias. Callers that need
//! to tell a transport failure apart from an authorization failure or an HTTP
//! status error downcast to [`PantryError`]:
//!
//! ```
//! use pantrypal::error::PantryError;
//!
//! let err: anyhow::Error = PantryError::Http { status: 404, body: "missing".into() }.into();
//! match err.downcast_ref::<PantryError>() {
//!     Some(PantryError::Http { status, .. }) => assert_eq!(*status, 404),
//!     other => panic!("unexpected error: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Main error type for PantryPal operations
#[derive(Error, Debug)]
pub enum PantryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failure or timeout; no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials missing, unrefreshable, or rejected twice
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Response status code
        status: u16,
        /// Raw response payload as returned by the server
        body: String,
    },

    /// Caller supplied input that cannot be acted on
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Local key-value storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

impl PantryError {
    /// Returns `true` for failures where no server response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, PantryError::Network(_))
    }

    /// Returns `true` for authorization failures.
    pub fn is_authentication(&self) -> bool {
        matches!(self, PantryError::Authentication(_))
    }

    /// Status code of an [`PantryError::Http`] error, if this is one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            PantryError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for PantryPal operations
///
/// Uses `anyhow::Error` so that context can be attached while propagating;
/// the underlying [`PantryError`] remains reachable through `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
