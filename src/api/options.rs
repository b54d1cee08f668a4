//! Per-request options

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};

use crate::error::{PantryError, Result};

/// Adjustments applied to a single request on top of the client defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use pantrypal::api::RequestOptions;
///
/// let options = RequestOptions::new()
///     .header("X-Request-Id", "abc")
///     .query("limit", "20")
///     .timeout(Duration::from_secs(30));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra request headers
    pub headers: Vec<(String, String)>,
    /// Query string pairs appended to the URL
    pub query: Vec<(String, String)>,
    /// Replaces the client-wide timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Options with no adjustments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query string pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Sets the timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks that every header is sendable and the timeout is non-zero.
    ///
    /// `Authorization` is attached by the pipeline from stored credentials
    /// and cannot be set here.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::InvalidInput` naming the offending header, or
    /// for a zero timeout.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in &self.headers {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| PantryError::InvalidInput(format!("Invalid header name: {}", name)))?;
            if header == AUTHORIZATION {
                return Err(PantryError::InvalidInput(
                    "Authorization is set from stored credentials".to_string(),
                )
                .into());
            }
            HeaderValue::from_str(value).map_err(|_| {
                PantryError::InvalidInput(format!("Invalid value for header {}", name))
            })?;
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(PantryError::InvalidInput("timeout must be greater than 0".into()).into());
        }

        Ok(())
    }

    /// Applies validated options to `builder`.
    pub(crate) fn apply(&self, mut builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder
    }
}
