//! Authenticated request pipeline
//!
//! [`ApiClient`] issues requests against the backend and owns the credential
//! lifecycle around them:
//!
//! 1. Before each transmission the current access token is read from the
//!    [`CredentialStore`] and sent as `Authorization: Bearer <token>`. The
//!    header is omitted when no usable token is stored.
//! 2. A `401 Unauthorized` triggers exactly one
//!    [`refresh_credentials`](ApiClient::refresh_credentials) followed by one
//!    retry with the new token. A second `401` is terminal: credentials are
//!    cleared and the call fails with `PantryError::Authentication`.
//! 3. Any other non-2xx status fails with `PantryError::Http`; transport
//!    failures and timeouts fail with `PantryError::Network`. Neither is
//!    retried.
//!
//! Refreshes are not coalesced. Two requests that hit `401` at the same time
//! each run their own refresh, and a backend that rotates refresh tokens may
//! invalidate one of them.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::options::RequestOptions;
use crate::api::response::ApiResponse;
use crate::auth::token_fields::{extract_credentials, extract_user_id};
use crate::auth::{CredentialPair, CredentialStore};
use crate::config::ApiConfig;
use crate::error::{PantryError, Result};

/// Outcome of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    /// User identifier reported by the backend, if any.
    pub user_id: Option<String>,
    /// Whether the backend issued a refresh token.
    pub has_refresh_token: bool,
}

/// HTTP client for the PantryPal backend.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use pantrypal::api::ApiClient;
/// use pantrypal::auth::CredentialStore;
/// use pantrypal::config::ApiConfig;
/// use pantrypal::storage::MemoryStore;
///
/// # async fn example() -> pantrypal::error::Result<()> {
/// let credentials = CredentialStore::new(Arc::new(MemoryStore::new()));
/// let client = ApiClient::new(&ApiConfig::default(), credentials)?;
/// client.sign_in("sam", "secret").await?;
/// let chats = client.get("/chats").await?;
/// println!("{}", chats.body);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: CredentialStore,
}

impl ApiClient {
    /// Builds a client with the configured base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `PantryError::Config` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, credentials: CredentialStore) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| PantryError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Credential store this client reads from and writes to.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends an authenticated request and returns the successful response.
    ///
    /// # Errors
    ///
    /// - `PantryError::Network` -- no response was received (including
    ///   timeout).
    /// - `PantryError::Authentication` -- the refresh after a `401` failed, or
    ///   the retried request was rejected again.
    /// - `PantryError::Http` -- any other non-2xx status, with the server's
    ///   payload.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse> {
        self.request_with(method, path, body, &RequestOptions::default())
            .await
    }

    /// Like [`request`](Self::request), with extra headers, query pairs or a
    /// timeout for this call. The options apply to the retry as well.
    ///
    /// # Errors
    ///
    /// As for [`request`](Self::request), plus `PantryError::InvalidInput`
    /// when `options` fail [`RequestOptions::validate`]; nothing is sent in
    /// that case.
    pub async fn request_with<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> Result<ApiResponse> {
        options.validate()?;
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(PantryError::from)?;
        let url = self.url(path);
        let token = self.current_access_token().await;

        tracing::debug!(%method, %url, authorized = token.is_some(), "Sending request");
        let response = self
            .send(method.clone(), &url, body.as_ref(), token.as_deref(), options)
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::into_api_response(response).await;
        }

        tracing::warn!(%method, %url, "Request received 401, attempting credential refresh");
        let new_token = self.refresh_credentials().await?;

        let retry = self
            .send(method.clone(), &url, body.as_ref(), Some(&new_token), options)
            .await?;

        if retry.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(%method, %url, "Request rejected again after refresh; signing out");
            self.sign_out().await;
            return Err(PantryError::Authentication(format!(
                "{} {} was rejected after refreshing credentials",
                method, path
            ))
            .into());
        }

        Self::into_api_response(retry).await
    }

    /// `GET path`
    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.request::<Value>(Method::GET, path, None).await
    }

    /// `POST path` with a JSON body
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// `DELETE path`
    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.request::<Value>(Method::DELETE, path, None).await
    }

    /// Exchanges the stored refresh token for new credentials.
    ///
    /// Returns the new access token after persisting it (and the new refresh
    /// token, when the server rotated it).
    ///
    /// # Errors
    ///
    /// Returns `PantryError::Authentication` on any failure. Every failure
    /// path clears all stored credentials first; a missing refresh token
    /// fails without touching the network.
    pub async fn refresh_credentials(&self) -> Result<String> {
        let refresh_token = match self.credentials.refresh_token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("No refresh token stored; signing out");
                self.sign_out().await;
                return Err(
                    PantryError::Authentication("no refresh token stored".to_string()).into(),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read refresh token; signing out");
                self.sign_out().await;
                return Err(PantryError::Authentication(format!(
                    "could not read refresh token: {}",
                    e
                ))
                .into());
            }
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Ok(access_token) => {
                tracing::info!("Credential refresh succeeded");
                Ok(access_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Credential refresh failed; signing out");
                self.sign_out().await;
                Err(PantryError::Authentication(format!("credential refresh failed: {}", e)).into())
            }
        }
    }

    /// Signs in with a username and password and stores the issued
    /// credentials.
    ///
    /// Previously stored credentials are cleared first so that a refresh
    /// token from an earlier session cannot outlive this sign-in. If storing
    /// the new session fails part way, whatever was written is cleared again.
    ///
    /// # Errors
    ///
    /// - `PantryError::Authentication` -- the backend rejected the
    ///   credentials (`401`) or issued no usable token.
    /// - `PantryError::Http` / `PantryError::Network` -- as for
    ///   [`request`](Self::request).
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignedIn> {
        let url = self.url("/auth/login");
        let body = json!({ "username": username, "password": password });

        let response = self
            .send(Method::POST, &url, Some(&body), None, &RequestOptions::default())
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(
                PantryError::Authentication("invalid username or password".to_string()).into(),
            );
        }

        let payload: Value = Self::into_api_response(response).await?.json()?;
        let pair = extract_credentials(&payload)?;
        let user_id = extract_user_id(&payload);

        self.credentials.clear().await;
        if let Err(e) = self.store_session(&pair, user_id.as_deref()).await {
            tracing::warn!(error = %e, "Failed to store credentials; discarding partial session");
            self.credentials.clear().await;
            return Err(e);
        }

        tracing::info!(user_id = ?user_id, "Signed in");
        Ok(SignedIn {
            user_id,
            has_refresh_token: pair.refresh_token.is_some(),
        })
    }

    /// Deletes all stored credentials. Never fails.
    pub async fn sign_out(&self) {
        self.credentials.clear().await;
        tracing::debug!("Stored credentials cleared");
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<String> {
        let url = self.url("/auth/refresh");
        let body = json!({ "refresh_token": refresh_token });

        let response = self
            .send(Method::POST, &url, Some(&body), None, &RequestOptions::default())
            .await?;
        let payload: Value = Self::into_api_response(response).await?.json()?;

        let pair = extract_credentials(&payload)?;
        self.credentials.store_pair(&pair).await?;
        Ok(pair.access_token)
    }

    /// Reads the access token, treating storage errors as "not signed in".
    async fn current_access_token(&self) -> Option<String> {
        match self.credentials.access_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read access token; sending unauthenticated");
                None
            }
        }
    }

    async fn store_session(&self, pair: &CredentialPair, user_id: Option<&str>) -> Result<()> {
        self.credentials.store_pair(pair).await?;
        if let Some(id) = user_id {
            self.credentials.store_user_id(id).await?;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
        options: &RequestOptions,
    ) -> reqwest::RequestBuilder {
        let mut builder = options.apply(self.http.request(method, url));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.build_request(method, url, body, token, options)
            .send()
            .await
            .map_err(|e| network_error(url, &e).into())
    }

    async fn into_api_response(response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| network_error(&url, &e))?;

        if status.is_success() {
            Ok(ApiResponse {
                status: status.as_u16(),
                body,
            })
        } else {
            tracing::debug!(status = status.as_u16(), %url, "Request failed");
            Err(PantryError::Http {
                status: status.as_u16(),
                body,
            }
            .into())
        }
    }
}

fn network_error(url: &str, error: &reqwest::Error) -> PantryError {
    if error.is_timeout() {
        PantryError::Network(format!("request to {} timed out", url))
    } else {
        PantryError::Network(format!("request to {} failed: {}", url, error))
    }
}
