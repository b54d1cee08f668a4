//! Command-line interface definition for PantryPal
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for signing in, managing chats and issuing raw
//! authenticated requests.

use clap::{Parser, Subcommand};

/// PantryPal - pantry and recipe assistant client
///
/// Signs in to the PantryPal backend, keeps a local cache of recipe chats
/// and talks to the assistant.
#[derive(Parser, Debug, Clone)]
#[command(name = "pantrypal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the backend base URL
    #[arg(long)]
    pub api_base: Option<String>,

    /// Override the local data directory
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for PantryPal
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Sign in and store the issued tokens
    Login {
        /// Account user name
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "PANTRYPAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored tokens
    Logout,

    /// Exchange the stored refresh token for a new access token
    Refresh,

    /// Manage recipe chats
    Chats {
        /// Chat subcommand
        #[command(subcommand)]
        command: ChatsCommand,
    },

    /// Send an authenticated request and print the response body
    Request {
        /// HTTP method (GET, POST, PUT, DELETE, ...)
        method: String,

        /// Path relative to the API base URL
        path: String,

        /// JSON request body
        #[arg(short, long)]
        body: Option<String>,

        /// Extra header as NAME:VALUE (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Query pair as KEY=VALUE (repeatable)
        #[arg(short, long)]
        query: Vec<String>,

        /// Timeout for this request in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
}

/// Chat management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChatsCommand {
    /// List chats, most recent first
    List {
        /// Output the list as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the messages of a chat
    Show {
        /// Chat identifier
        id: String,

        /// Output the transcript as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete a chat locally and on the server
    Delete {
        /// Chat identifier
        id: String,
    },

    /// Start an empty chat
    New {
        /// Chat title
        #[arg(short, long, default_value = "New chat")]
        title: String,
    },

    /// Start a chat from a recipe (JSON or plain text)
    Recipe {
        /// Recipe JSON or text
        text: String,
    },

    /// Send a message to the assistant in an existing chat
    Send {
        /// Chat identifier
        id: String,

        /// Message text
        message: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            api_base: None,
            data_dir: None,
            command: Commands::Chats {
                command: ChatsCommand::List { json: false },
            },
        }
    }
}
