/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `auth`    -- sign in, sign out and token refresh
- `chats`   -- chat listing, history and assistant exchanges
- `request` -- raw authenticated request

Every handler builds an [`AppContext`] from the loaded configuration and
delegates to the library components.
*/

use crate::api::ApiClient;
use crate::auth::CredentialStore;
use crate::chat::{ChatService, ChatStore};
use crate::config::Config;
use crate::error::Result;
use crate::storage::open_stores;

pub mod chats;
pub mod request;

/// The components a command runs against, wired from configuration.
#[derive(Clone)]
pub struct AppContext {
    /// Authenticated backend client
    pub client: ApiClient,
    /// Chat operations over the backend and the local cache
    pub chats: ChatService,
}

impl AppContext {
    /// Opens the local stores and builds the client and chat service.
    ///
    /// # Errors
    ///
    /// Returns storage errors from opening the data directory and config
    /// errors from building the HTTP client.
    pub fn open(config: &Config) -> Result<Self> {
        let stores = open_stores(&config.storage)?;
        let client = ApiClient::new(&config.api, CredentialStore::new(stores.credentials))?;
        let chats = ChatService::new(client.clone(), ChatStore::new(stores.chats));
        Ok(Self { client, chats })
    }
}

pub mod auth {
    use super::*;
    use colored::Colorize;

    /// Signs in and reports the outcome.
    pub async fn login(config: &Config, username: &str, password: &str) -> Result<()> {
        let ctx = AppContext::open(config)?;
        tracing::info!("Signing in as {}", username);

        let signed_in = ctx.client.sign_in(username, password).await?;

        match signed_in.user_id {
            Some(id) => println!("{}", format!("Signed in as {}", id).green()),
            None => println!("{}", "Signed in".green()),
        }
        if !signed_in.has_refresh_token {
            println!(
                "{}",
                "The server issued no refresh token; you will need to sign in again when the session expires."
                    .yellow()
            );
        }
        Ok(())
    }

    /// Clears stored credentials.
    pub async fn logout(config: &Config) -> Result<()> {
        let ctx = AppContext::open(config)?;
        ctx.client.sign_out().await;
        println!("{}", "Signed out".green());
        Ok(())
    }

    /// Forces a token refresh.
    ///
    /// A failed refresh signs the user out, exactly as it does when triggered
    /// by a `401`.
    pub async fn refresh(config: &Config) -> Result<()> {
        let ctx = AppContext::open(config)?;
        ctx.client.refresh_credentials().await?;
        println!("{}", "Session refreshed".green());
        Ok(())
    }
}
