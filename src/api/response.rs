//! Successful API responses

use anyhow::Context;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A 2xx response from the backend with its body fully read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a serialization error with context when the body is not valid
    /// JSON for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pantrypal::api::ApiResponse;
    ///
    /// let response = ApiResponse { status: 200, body: r#"{"response":"hi"}"#.to_string() };
    /// let value: serde_json::Value = response.json().unwrap();
    /// assert_eq!(value["response"], "hi");
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::from_str(&self.body)
            .map_err(crate::error::PantryError::from)
            .with_context(|| format!("Failed to decode {} response body", self.status))?;
        Ok(value)
    }

    /// Returns `true` when the server sent no body (for example `204`).
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }
}
