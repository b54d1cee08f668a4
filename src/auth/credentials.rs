//! Credential persistence
//!
//! The access token, refresh token and cached user id live as three scalar
//! entries in a [`KeyValueStore`]. Some storage layers hand back a literal
//! such as `"null"` or `"undefined"` instead of a true empty result; those
//! values are treated exactly like a missing entry.

use std::sync::Arc;

use crate::error::{PantryError, Result};
use crate::storage::KeyValueStore;

/// Storage key of the short-lived access token.
pub const ACCESS_TOKEN_KEY: &str = "userToken";

/// Storage key of the long-lived refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Storage key of the cached user identifier.
pub const USER_ID_KEY: &str = "userId";

/// Literals a storage layer may return in place of "no value".
const ABSENCE_MARKERS: [&str; 3] = ["null", "undefined", "none"];

/// Returns `true` when `value` stands for "no value".
///
/// Blank strings and the literals `null`, `undefined` and `None` (any case)
/// count as absent.
///
/// # Examples
///
/// ```
/// use pantrypal::auth::credentials::is_absence_marker;
///
/// assert!(is_absence_marker(""));
/// assert!(is_absence_marker("undefined"));
/// assert!(is_absence_marker(" NULL "));
/// assert!(!is_absence_marker("eyJhbGciOiJIUzI1NiJ9.e30.sig"));
/// ```
pub fn is_absence_marker(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || ABSENCE_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Returns `true` when `value` can be sent as a bearer credential.
///
/// A usable token is not an absence marker and contains no whitespace or
/// control characters.
///
/// # Examples
///
/// ```
/// use pantrypal::auth::credentials::is_usable_token;
///
/// assert!(is_usable_token("abc.def.ghi"));
/// assert!(!is_usable_token("null"));
/// assert!(!is_usable_token("two words"));
/// ```
pub fn is_usable_token(value: &str) -> bool {
    !is_absence_marker(value)
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
}

/// Tokens issued together by a sign-in or refresh response.
///
/// The refresh token is optional because the refresh endpoint is not
/// required to rotate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Long-lived credential, when the server issued one.
    pub refresh_token: Option<String>,
}

/// Reads and writes the client's credentials.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Wraps a storage port.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current access token, or `None` when absent or a sentinel.
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.read_token(ACCESS_TOKEN_KEY).await
    }

    /// Current refresh token, or `None` when absent or a sentinel.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.read_token(REFRESH_TOKEN_KEY).await
    }

    /// Cached user identifier, if any.
    pub async fn user_id(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .get(USER_ID_KEY)
            .await?
            .filter(|value| !is_absence_marker(value)))
    }

    /// Persists a credential pair.
    ///
    /// Both tokens are validated before anything is written, so a pair with
    /// an unusable refresh token leaves storage untouched. When the pair
    /// carries no refresh token the stored one is kept.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::Authentication` if either token is not usable,
    /// or the storage error if a write fails.
    pub async fn store_pair(&self, pair: &CredentialPair) -> Result<()> {
        if !is_usable_token(&pair.access_token) {
            return Err(PantryError::Authentication(
                "refusing to store an unusable access token".to_string(),
            )
            .into());
        }

        if let Some(refresh) = &pair.refresh_token {
            if !is_usable_token(refresh) {
                return Err(PantryError::Authentication(
                    "refusing to store an unusable refresh token".to_string(),
                )
                .into());
            }
        }

        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token).await?;
        if let Some(refresh) = &pair.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, refresh).await?;
        }

        Ok(())
    }

    /// Persists the signed-in user's identifier.
    pub async fn store_user_id(&self, user_id: &str) -> Result<()> {
        self.store.set(USER_ID_KEY, user_id).await
    }

    /// Deletes every stored credential.
    ///
    /// Never fails: each key is attempted independently and storage errors
    /// are only logged.
    pub async fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_ID_KEY] {
            if let Err(e) = self.store.delete(key).await {
                tracing::warn!(key, error = %e, "Failed to delete stored credential");
            }
        }
    }

    async fn read_token(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .store
            .get(key)
            .await?
            .filter(|value| !is_absence_marker(value)))
    }
}
